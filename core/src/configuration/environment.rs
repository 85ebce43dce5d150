use thiserror::Error;
use tracing::info;

use oidc_frontend_types::issuer::Issuer;

use crate::configuration::csrf::CsrfConfiguration;
use crate::configuration::routes::Routes;
use crate::configuration::{
    OpenIDProviderConfiguration, OpenIDProviderConfigurationBuilder,
    OpenIDProviderConfigurationBuilderError,
};
use crate::keystore::KeyProvider;

pub const PUBLIC_KEY_VAR: &str = "OIDC_PUBLIC_KEY";
pub const PRIVATE_KEY_VAR: &str = "OIDC_PRIVATE_KEY";
pub const BASE_URL_VAR: &str = "OIDC_BASE_URL";
pub const API_ROOT_VAR: &str = "OIDC_API_ROOT";
pub const API_NAMESPACE_VAR: &str = "OIDC_API_NAMESPACE";
pub const CSRF_SECRET_VAR: &str = "OIDC_CSRF_SECRET";

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid {}: {}", BASE_URL_VAR, .0)]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error(transparent)]
    Builder(#[from] OpenIDProviderConfigurationBuilderError),
}

impl OpenIDProviderConfiguration {
    /// Reads the provider configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = OpenIDProviderConfigurationBuilder::default();
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            builder = builder.issuer(Issuer::new(&base_url)?);
        }

        let defaults = Routes::default();
        let routes = Routes::new(
            lookup(API_ROOT_VAR).unwrap_or(defaults.api_root),
            lookup(API_NAMESPACE_VAR).unwrap_or(defaults.namespace),
        );
        builder = builder.routes(routes);

        if let Some(secret) = lookup(CSRF_SECRET_VAR).filter(|it| !it.is_empty()) {
            builder = builder.csrf(CsrfConfiguration::with_secret(secret));
        }

        let key_provider = KeyProvider::new(
            lookup(PUBLIC_KEY_VAR).map(unescape_pem),
            lookup(PRIVATE_KEY_VAR).map(unescape_pem),
        );
        match key_provider.get_key_pair() {
            Some(keys) => builder = builder.keys(keys),
            None => info!(
                "{} or {} not set, OpenID Connect routes are disabled",
                PUBLIC_KEY_VAR, PRIVATE_KEY_VAR
            ),
        }
        Ok(builder.build()?)
    }
}

// Single-line env files usually carry PEM newlines as a literal `\n`.
fn unescape_pem(value: String) -> String {
    if value.contains('\n') {
        value
    } else {
        value.replace("\\n", "\n")
    }
}
