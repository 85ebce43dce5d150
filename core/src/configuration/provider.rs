use std::fmt::Debug;

use derive_builder::Builder;
use getset::Getters;
use url::{ParseError, Url};

use oidc_frontend_types::issuer::Issuer;
use oidc_frontend_types::jose::jwk_set::RS256;

use crate::configuration::csrf::CsrfConfiguration;
use crate::configuration::routes::Routes;
use crate::keystore::KeyPair;

const DEFAULT_ISSUER: &str = "http://localhost:3000/";

#[derive(Debug, Builder, Getters)]
#[builder(pattern = "owned", setter(into, strip_option), default)]
#[getset(get = "pub")]
pub struct OpenIDProviderConfiguration {
    issuer: Issuer,
    /// `None` disables every OIDC route.
    keys: Option<KeyPair>,
    routes: Routes,
    csrf: CsrfConfiguration,
    scopes_supported: Vec<String>,
    response_types_supported: Vec<String>,
    id_token_signing_alg_values_supported: Vec<String>,
    subject_types_supported: Vec<String>,
}

impl OpenIDProviderConfiguration {
    pub fn jwks_path(&self) -> String {
        format!("{}{}", self.issuer.base_path(), self.routes.jwks)
    }

    pub fn discovery_path(&self) -> String {
        format!("{}{}", self.issuer.base_path(), self.routes.discovery)
    }

    pub fn jwks_uri(&self) -> Result<Url, ParseError> {
        self.issuer.join(&self.routes.jwks)
    }

    /// Absolute url of an engine REST endpoint, e.g. `authorize`.
    pub fn rest_url(&self, name: &str) -> Result<Url, ParseError> {
        self.issuer.join(&self.routes.endpoint(name))
    }

    /// Route key of a request path: the part after the base path, without
    /// leading or trailing slashes. `None` when the path is outside the
    /// deployment.
    pub fn route_of<'a>(&self, path: &'a str) -> Option<&'a str> {
        let base = self.issuer.base_path();
        let relative = if path.len() + 1 == base.len() && base.starts_with(path) {
            ""
        } else {
            path.strip_prefix(base)?
        };
        Some(relative.trim_matches('/'))
    }
}

impl Default for OpenIDProviderConfiguration {
    fn default() -> Self {
        OpenIDProviderConfiguration {
            issuer: Issuer::new(DEFAULT_ISSUER).expect("Default issuer should be a valid url"),
            keys: None,
            routes: Routes::default(),
            csrf: CsrfConfiguration::default(),
            scopes_supported: vec!["openid".to_owned(), "profile".to_owned()],
            response_types_supported: vec!["code".to_owned()],
            id_token_signing_alg_values_supported: vec![RS256.to_owned()],
            subject_types_supported: vec!["public".to_owned()],
        }
    }
}
