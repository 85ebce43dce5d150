use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::{Error as UuidError, Uuid};

use oidc_frontend_types::subject::Subject;

/// A user the host identity system reports as logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    subject: Subject,
    auth_time: OffsetDateTime,
}

impl AuthenticatedUser {
    pub fn new(subject: Subject, auth_time: OffsetDateTime) -> Self {
        Self { subject, auth_time }
    }

    pub fn sub(&self) -> &Subject {
        &self.subject
    }

    pub fn auth_time(&self) -> OffsetDateTime {
        self.auth_time
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SessionID(Uuid);

impl SessionID {
    pub fn new() -> Self {
        SessionID::default()
    }
}

impl FromStr for SessionID {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let session_id = Uuid::from_str(s)?;
        Ok(SessionID(session_id))
    }
}

impl Default for SessionID {
    fn default() -> Self {
        SessionID(Uuid::new_v4())
    }
}

impl Display for SessionID {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
