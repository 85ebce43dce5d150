use std::sync::Arc;

use async_trait::async_trait;

use oidc_frontend_types::discovery::{OIDCProviderMetadata, OIDCProviderMetadataBuilder};

use crate::adapter::OAuth2Engine;
use crate::configuration::OpenIDProviderConfiguration;
use crate::error::OidcError;
use crate::handler::RequestHandler;
use crate::request::OidcRequest;
use crate::response::OidcResponse;

pub struct DiscoveryService {
    provider: Arc<OpenIDProviderConfiguration>,
    engine: Arc<dyn OAuth2Engine + Send + Sync>,
}

impl DiscoveryService {
    pub fn new(
        provider: Arc<OpenIDProviderConfiguration>,
        engine: Arc<dyn OAuth2Engine + Send + Sync>,
    ) -> Self {
        Self { provider, engine }
    }

    pub fn metadata(&self) -> Result<OIDCProviderMetadata, OidcError> {
        let provider = &self.provider;
        let metadata = OIDCProviderMetadataBuilder::default()
            .issuer(provider.issuer().clone())
            .authorization_endpoint(self.engine.authorization_endpoint())
            .token_endpoint(self.engine.token_endpoint())
            .userinfo_endpoint(self.engine.userinfo_endpoint())
            .jwks_uri(provider.jwks_uri()?)
            .scopes_supported(provider.scopes_supported().clone())
            .response_types_supported(provider.response_types_supported().clone())
            .id_token_signing_alg_values_supported(
                provider.id_token_signing_alg_values_supported().clone(),
            )
            .subject_types_supported(
                Some(provider.subject_types_supported().clone()).filter(|it| !it.is_empty()),
            )
            .build()?;
        Ok(metadata)
    }
}

#[async_trait]
impl RequestHandler for DiscoveryService {
    fn name(&self) -> &'static str {
        "discovery"
    }

    async fn handle(&self, request: &OidcRequest) -> Result<Option<OidcResponse>, OidcError> {
        if request.path() != self.provider.discovery_path() {
            return Ok(None);
        }
        let metadata = self.metadata()?;
        Ok(Some(OidcResponse::Json(serde_json::to_string(&metadata)?)))
    }
}
