use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use url::{ParseError, Url};

/// The provider's issuer identifier.
///
/// Always carries a trailing slash so that well-known documents and
/// relative endpoints can be resolved with [`Issuer::join`] without dropping
/// the deployment's base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer(Url);

impl Issuer {
    pub fn new(identifier: &str) -> Result<Self, ParseError> {
        let mut url = Url::parse(identifier)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Issuer(url))
    }

    pub fn inner_ref(&self) -> &Url {
        &self.0
    }

    /// Path component of the base url, always ending in `/`.
    pub fn base_path(&self) -> &str {
        self.0.path()
    }

    pub fn join(&self, relative: &str) -> Result<Url, ParseError> {
        self.0.join(relative.trim_start_matches('/'))
    }
}

impl Serialize for Issuer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct("Issuer", &self.0)
    }
}

impl Display for Issuer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
