use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::trace::TraceLayer;
use tracing::info;

use oidc_frontend_core::adapter::EngineError;
use oidc_frontend_core::configuration::OpenIDProviderConfiguration;
use oidc_frontend_core::handler::{Collaborators, HandlerChain};

use crate::middleware::{OidcLayer, SessionManagerLayer};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Error wiring OpenID Connect handlers: {}", .0)]
    Engine(#[from] EngineError),
    #[error("Error running oidc server {}", .0)]
    Io(#[from] std::io::Error),
}

/// Host application with the OIDC handlers in front of it.
pub struct OidcServer {
    provider: Arc<OpenIDProviderConfiguration>,
    collaborators: Collaborators,
    custom_routes: Option<Router>,
    session_key: Option<Key>,
}

impl OidcServer {
    pub fn new(provider: OpenIDProviderConfiguration, collaborators: Collaborators) -> Self {
        Self {
            provider: Arc::new(provider),
            collaborators,
            custom_routes: None,
            session_key: None,
        }
    }

    pub fn with_router(self, router: Router) -> Self {
        Self {
            custom_routes: Some(router),
            ..self
        }
    }

    /// Key signing the session cookie. A random key is generated when unset,
    /// so sessions do not survive a restart.
    pub fn with_session_key(self, key: Key) -> Self {
        Self {
            session_key: Some(key),
            ..self
        }
    }

    pub fn into_router(self) -> Result<Router, ServerError> {
        let chain = HandlerChain::initialise(self.provider.clone(), self.collaborators)?;
        info!("OpenID Connect handlers: {:?}", chain.names());
        let secure = self.provider.issuer().inner_ref().scheme() == "https";
        let key = self.session_key.unwrap_or_else(Key::generate);
        let router = self.custom_routes.unwrap_or_default();
        Ok(router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(SessionManagerLayer::signed(key).secure(secure))
                .layer(OidcLayer::new(chain)),
        ))
    }

    pub async fn run(self, addr: SocketAddr) -> Result<(), ServerError> {
        let router = self.into_router()?;
        let listener = TcpListener::bind(addr).await?;
        info!("OpenId Server listening on {}", addr);
        axum::serve(listener, router).await?;
        Ok(())
    }
}
