use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use oidc_frontend_types::client::ClientID;
use oidc_frontend_types::subject::Subject;

use crate::authorisation_request::AuthorisationRequest;
use crate::keystore::KeyPair;
use crate::session::{AuthenticatedUser, SessionID};

pub mod in_memory;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error(transparent)]
    DB(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("OAuth2 engine refused key storage: {}", .0)]
    Storage(#[source] anyhow::Error),
    #[error("OAuth2 engine failure: {}", .0)]
    Internal(#[from] anyhow::Error),
}

/// The external OAuth2 engine issuing codes and tokens.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait OAuth2Engine {
    /// Hands the signing keys to the engine. Called once at start up.
    fn add_storage(&self, keys: &KeyPair) -> Result<(), EngineError>;

    async fn is_consent_needed(
        &self,
        user: &AuthenticatedUser,
        request: &AuthorisationRequest,
    ) -> Result<bool, EngineError>;

    fn authorization_endpoint(&self) -> Url;

    fn token_endpoint(&self) -> Url;

    fn userinfo_endpoint(&self) -> Url;
}

#[async_trait]
pub trait ClientRegistry {
    async fn client_name(&self, client_id: &ClientID) -> Result<Option<String>, PersistenceError>;
}

/// Login and session state owned by the host application.
#[async_trait]
pub trait IdentityProvider {
    async fn authenticated_user(&self, session: &SessionID) -> Option<AuthenticatedUser>;

    /// Where to send an anonymous caller; `return_to` is the url to come back to.
    fn login_url(&self, return_to: &Url) -> Url;
}

/// Data handed to the host template that asks the user for consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentContext {
    pub client_id: ClientID,
    pub client_name: String,
    pub subject: Subject,
    /// Form target, the engine's authorize endpoint.
    pub action: Url,
    /// Hidden form fields, anti-forgery token included.
    pub parameters: Vec<(String, String)>,
}

pub trait ConsentRenderer {
    fn render(&self, context: &ConsentContext) -> anyhow::Result<String>;
}
