use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::configuration::OpenIDProviderConfiguration;
use crate::error::OidcError;
use crate::handler::RequestHandler;
use crate::request::OidcRequest;
use crate::response::OidcResponse;

/// Publishes the configured public key as a JSON Web Key Set.
pub struct JwksService {
    provider: Arc<OpenIDProviderConfiguration>,
}

impl JwksService {
    pub fn new(provider: Arc<OpenIDProviderConfiguration>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RequestHandler for JwksService {
    fn name(&self) -> &'static str {
        "jwks"
    }

    async fn handle(&self, request: &OidcRequest) -> Result<Option<OidcResponse>, OidcError> {
        if request.path() != self.provider.jwks_path() {
            return Ok(None);
        }
        let Some(keys) = self.provider.keys() else {
            debug!("No public key configured, not serving jwks");
            return Ok(None);
        };
        let jwks = match keys.jwk_set() {
            Ok(jwks) => jwks,
            Err(err) => {
                error!("Configured public key is unusable, not serving jwks: {}", err);
                return Ok(None);
            }
        };
        Ok(Some(OidcResponse::Json(serde_json::to_string(&jwks)?)))
    }
}
