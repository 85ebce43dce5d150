use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("client_id must not be empty")]
pub struct ParseError;

/// Opaque client identifier as presented in an authorization request.
#[derive(Serialize, Deserialize, Clone, Debug, Hash, Eq, PartialEq)]
pub struct ClientID(String);

impl ClientID {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ClientID {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseError);
        }
        Ok(Self(s.to_owned()))
    }
}

impl From<ClientID> for String {
    fn from(id: ClientID) -> Self {
        id.0
    }
}

impl Display for ClientID {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
