use url::form_urlencoded;

use crate::session::SessionID;

/// An inbound HTTP request, reduced to what the OIDC handlers inspect.
#[derive(Debug, Clone)]
pub struct OidcRequest {
    path: String,
    query: Vec<(String, String)>,
    session: SessionID,
}

impl OidcRequest {
    pub fn new<P: Into<String>>(path: P, query: Option<&str>, session: SessionID) -> Self {
        let query = query
            .map(|raw| form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self {
            path: path.into(),
            query,
            session,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in the order they were received.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn session(&self) -> &SessionID {
        &self.session
    }
}
