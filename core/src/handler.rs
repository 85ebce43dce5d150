use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::adapter::{ClientRegistry, ConsentRenderer, EngineError, IdentityProvider, OAuth2Engine};
use crate::configuration::OpenIDProviderConfiguration;
use crate::error::OidcError;
use crate::request::OidcRequest;
use crate::response::OidcResponse;
use crate::services::authenticate::AuthenticateService;
use crate::services::discovery::DiscoveryService;
use crate::services::jwks::JwksService;

#[async_trait]
pub trait RequestHandler {
    fn name(&self) -> &'static str;

    /// `Ok(None)` leaves the request to the next handler, or to the host.
    async fn handle(&self, request: &OidcRequest) -> Result<Option<OidcResponse>, OidcError>;
}

/// Host provided collaborators the handlers delegate to.
#[derive(Clone)]
pub struct Collaborators {
    pub engine: Arc<dyn OAuth2Engine + Send + Sync>,
    pub clients: Arc<dyn ClientRegistry + Send + Sync>,
    pub identity: Arc<dyn IdentityProvider + Send + Sync>,
    pub consent: Arc<dyn ConsentRenderer + Send + Sync>,
}

/// Ordered request interceptors. The first handler producing a response wins.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn RequestHandler + Send + Sync>>,
}

impl HandlerChain {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(handlers: Vec<Arc<dyn RequestHandler + Send + Sync>>) -> Self {
        Self { handlers }
    }

    /// Wires the OIDC handlers. Without a key pair nothing is registered and
    /// every request reaches the host untouched.
    pub fn initialise(
        provider: Arc<OpenIDProviderConfiguration>,
        collaborators: Collaborators,
    ) -> Result<Self, EngineError> {
        let Some(keys) = provider.keys() else {
            info!("No signing keys configured, OpenID Connect handlers disabled");
            return Ok(Self::empty());
        };
        if let Err(err) = keys.validate() {
            warn!("Configured signing keys are unusable: {}", err);
        }
        collaborators.engine.add_storage(keys)?;

        let Collaborators {
            engine,
            clients,
            identity,
            consent,
        } = collaborators;
        Ok(Self::new(vec![
            Arc::new(JwksService::new(provider.clone())),
            Arc::new(DiscoveryService::new(provider.clone(), engine.clone())),
            Arc::new(AuthenticateService::new(
                provider, engine, clients, identity, consent,
            )),
        ]))
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    pub async fn dispatch(&self, request: &OidcRequest) -> Result<Option<OidcResponse>, OidcError> {
        for handler in &self.handlers {
            if let Some(response) = handler.handle(request).await? {
                debug!("{} handled {}", handler.name(), request.path());
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
