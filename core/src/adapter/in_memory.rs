use std::sync::{Arc, OnceLock};

use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use time::OffsetDateTime;
use url::Url;

use oidc_frontend_types::client::ClientID;
use oidc_frontend_types::subject::Subject;

use crate::adapter::{ClientRegistry, EngineError, IdentityProvider, OAuth2Engine, PersistenceError};
use crate::authorisation_request::AuthorisationRequest;
use crate::configuration::OpenIDProviderConfiguration;
use crate::keystore::KeyPair;
use crate::session::{AuthenticatedUser, SessionID};

const REDIRECT_TO_PARAM: &str = "redirect_to";

#[derive(Debug, Clone, Default)]
pub struct InMemoryClientRegistry {
    clients: Arc<DashMap<ClientID, String>>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<N: Into<String>>(&self, client_id: ClientID, name: N) {
        self.clients.insert(client_id, name.into());
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn client_name(&self, client_id: &ClientID) -> Result<Option<String>, PersistenceError> {
        Ok(self.clients.get(client_id).map(|name| name.value().clone()))
    }
}

/// Engine stand-in that remembers which user granted which client.
#[derive(Debug)]
pub struct InMemoryEngine {
    authorization_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
    keys: OnceLock<KeyPair>,
    grants: DashSet<(Subject, ClientID)>,
}

impl InMemoryEngine {
    /// Endpoints are mounted under the configured REST namespace.
    pub fn new(configuration: &OpenIDProviderConfiguration) -> Result<Self, url::ParseError> {
        Ok(Self {
            authorization_endpoint: configuration.rest_url("authorize")?,
            token_endpoint: configuration.rest_url("token")?,
            userinfo_endpoint: configuration.rest_url("userinfo")?,
            keys: OnceLock::new(),
            grants: DashSet::new(),
        })
    }

    pub fn grant(&self, subject: Subject, client_id: ClientID) {
        self.grants.insert((subject, client_id));
    }

    pub fn keys(&self) -> Option<&KeyPair> {
        self.keys.get()
    }
}

#[async_trait]
impl OAuth2Engine for InMemoryEngine {
    fn add_storage(&self, keys: &KeyPair) -> Result<(), EngineError> {
        self.keys
            .set(keys.clone())
            .map_err(|_| EngineError::Storage(anyhow!("signing keys already registered")))
    }

    async fn is_consent_needed(
        &self,
        user: &AuthenticatedUser,
        request: &AuthorisationRequest,
    ) -> Result<bool, EngineError> {
        let grant = (user.sub().clone(), request.client_id().clone());
        Ok(!self.grants.contains(&grant))
    }

    fn authorization_endpoint(&self) -> Url {
        self.authorization_endpoint.clone()
    }

    fn token_endpoint(&self) -> Url {
        self.token_endpoint.clone()
    }

    fn userinfo_endpoint(&self) -> Url {
        self.userinfo_endpoint.clone()
    }
}

/// Session to user mapping kept in process memory.
#[derive(Debug, Clone)]
pub struct InMemoryIdentity {
    login_page: Url,
    users: Arc<DashMap<SessionID, AuthenticatedUser>>,
}

impl InMemoryIdentity {
    pub fn new(login_page: Url) -> Self {
        Self {
            login_page,
            users: Arc::new(DashMap::new()),
        }
    }

    pub fn login(&self, session: SessionID, subject: Subject) -> AuthenticatedUser {
        let user = AuthenticatedUser::new(subject, OffsetDateTime::now_utc());
        self.users.insert(session, user.clone());
        user
    }

    pub fn logout(&self, session: &SessionID) {
        self.users.remove(session);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn authenticated_user(&self, session: &SessionID) -> Option<AuthenticatedUser> {
        self.users.get(session).map(|user| user.value().clone())
    }

    fn login_url(&self, return_to: &Url) -> Url {
        let mut url = self.login_page.clone();
        url.query_pairs_mut()
            .append_pair(REDIRECT_TO_PARAM, return_to.as_str());
        url
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use url::Url;

    use oidc_frontend_types::client::ClientID;
    use oidc_frontend_types::subject::Subject;

    use crate::adapter::in_memory::{InMemoryClientRegistry, InMemoryEngine, InMemoryIdentity};
    use crate::adapter::{ClientRegistry, EngineError, IdentityProvider, OAuth2Engine};
    use crate::authorisation_request::AuthorisationRequest;
    use crate::configuration::OpenIDProviderConfiguration;
    use crate::keystore::tests::key_pair;
    use crate::session::SessionID;

    #[tokio::test]
    async fn test_registry_resolves_registered_clients() {
        let registry = InMemoryClientRegistry::new();
        let client_id = ClientID::from_str("abc").unwrap();
        registry.register(client_id.clone(), "Relying Party");

        assert_eq!(
            Some("Relying Party".to_owned()),
            registry.client_name(&client_id).await.unwrap()
        );
        assert_eq!(
            None,
            registry
                .client_name(&ClientID::from_str("unknown123").unwrap())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_engine_requires_consent_until_granted() {
        let engine = InMemoryEngine::new(&OpenIDProviderConfiguration::default()).unwrap();
        let identity = InMemoryIdentity::new(Url::parse("http://localhost:3000/login").unwrap());
        let client_id = ClientID::from_str("abc").unwrap();
        let user = identity.login(SessionID::new(), Subject::new("alice"));
        let request = AuthorisationRequest::new(client_id.clone(), vec![]);

        assert!(engine.is_consent_needed(&user, &request).await.unwrap());
        engine.grant(Subject::new("alice"), client_id);
        assert!(!engine.is_consent_needed(&user, &request).await.unwrap());
    }

    #[test]
    fn test_engine_accepts_keys_once() {
        let engine = InMemoryEngine::new(&OpenIDProviderConfiguration::default()).unwrap();

        assert!(engine.add_storage(&key_pair()).is_ok());
        assert!(matches!(
            engine.add_storage(&key_pair()),
            Err(EngineError::Storage(_))
        ));
        assert_eq!(Some(&key_pair()), engine.keys());
        assert_eq!(
            "http://localhost:3000/api/openid-connect/authorize",
            engine.authorization_endpoint().as_str()
        );
    }

    #[tokio::test]
    async fn test_identity_tracks_sessions() {
        let identity = InMemoryIdentity::new(Url::parse("http://localhost:3000/login").unwrap());
        let session = SessionID::new();

        assert!(identity.authenticated_user(&session).await.is_none());
        identity.login(session, Subject::new("alice"));
        assert!(identity.authenticated_user(&session).await.is_some());
        identity.logout(&session);
        assert!(identity.authenticated_user(&session).await.is_none());

        let return_to = Url::parse("http://localhost:3000/openid-connect/authenticate?client_id=abc").unwrap();
        assert_eq!(
            "http://localhost:3000/login?redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fopenid-connect%2Fauthenticate%3Fclient_id%3Dabc",
            identity.login_url(&return_to).as_str()
        );
    }
}
