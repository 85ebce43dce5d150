const JWKS: &str = ".well-known/jwks.json";
const DISCOVERY: &str = ".well-known/openid-configuration";
const API_ROOT: &str = "api";
const NAMESPACE: &str = "openid-connect";

/// Route layout, relative to the issuer's base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub jwks: String,
    pub discovery: String,
    pub api_root: String,
    pub namespace: String,
}

impl Routes {
    pub fn new<R: Into<String>, N: Into<String>>(api_root: R, namespace: N) -> Self {
        Routes {
            api_root: api_root.into(),
            namespace: namespace.into(),
            ..Routes::default()
        }
    }

    /// Route key of the authenticate flow, e.g. `openid-connect/authenticate`.
    pub fn authenticate(&self) -> String {
        format!("{}/authenticate", self.namespace.trim_matches('/'))
    }

    /// Relative location of a REST endpoint served by the OAuth2 engine.
    pub fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.api_root.trim_matches('/'),
            self.namespace.trim_matches('/'),
            name
        )
    }
}

impl Default for Routes {
    fn default() -> Self {
        Routes {
            jwks: JWKS.to_owned(),
            discovery: DISCOVERY.to_owned(),
            api_root: API_ROOT.to_owned(),
            namespace: NAMESPACE.to_owned(),
        }
    }
}
