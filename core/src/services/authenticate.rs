use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use oidc_frontend_types::client::ClientID;

use crate::adapter::{ClientRegistry, ConsentContext, ConsentRenderer, IdentityProvider, OAuth2Engine};
use crate::authorisation_request::AuthorisationRequest;
use crate::configuration::OpenIDProviderConfiguration;
use crate::error::OidcError;
use crate::handler::RequestHandler;
use crate::request::OidcRequest;
use crate::response::OidcResponse;
use crate::services::nonce::NonceService;

pub const CLIENT_ID_PARAM: &str = "client_id";
pub const AUTHORIZE_ACTION: &str = "oidc_authorize";

/// Front door of the authorization flow.
///
/// Requests for unknown clients are left unhandled so the route is
/// indistinguishable from any other page to an anonymous caller.
pub struct AuthenticateService {
    provider: Arc<OpenIDProviderConfiguration>,
    engine: Arc<dyn OAuth2Engine + Send + Sync>,
    clients: Arc<dyn ClientRegistry + Send + Sync>,
    identity: Arc<dyn IdentityProvider + Send + Sync>,
    consent: Arc<dyn ConsentRenderer + Send + Sync>,
    nonce: NonceService,
}

impl AuthenticateService {
    pub fn new(
        provider: Arc<OpenIDProviderConfiguration>,
        engine: Arc<dyn OAuth2Engine + Send + Sync>,
        clients: Arc<dyn ClientRegistry + Send + Sync>,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
        consent: Arc<dyn ConsentRenderer + Send + Sync>,
    ) -> Self {
        let nonce = NonceService::new(provider.csrf());
        Self {
            provider,
            engine,
            clients,
            identity,
            consent,
            nonce,
        }
    }

    async fn registered_client(&self, request: &OidcRequest) -> Option<(ClientID, String)> {
        let client_id = request
            .query_param(CLIENT_ID_PARAM)
            .and_then(|id| ClientID::from_str(id).ok())?;
        match self.clients.client_name(&client_id).await {
            Ok(Some(name)) if !name.trim().is_empty() => Some((client_id, name)),
            Ok(_) => {
                debug!("Unknown client {}, ignoring authenticate request", client_id);
                None
            }
            Err(err) => {
                warn!("Client lookup for {} failed: {}", client_id, err);
                None
            }
        }
    }

    fn current_url(&self, request: &OidcRequest) -> Url {
        let mut url = self.provider.issuer().inner_ref().clone();
        url.set_path(request.path());
        if request.query().is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(request.query().iter());
        }
        url
    }
}

#[async_trait]
impl RequestHandler for AuthenticateService {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn handle(&self, request: &OidcRequest) -> Result<Option<OidcResponse>, OidcError> {
        let route = self.provider.routes().authenticate();
        if self.provider.route_of(request.path()) != Some(route.as_str()) {
            return Ok(None);
        }
        let Some((client_id, client_name)) = self.registered_client(request).await else {
            return Ok(None);
        };

        let Some(user) = self.identity.authenticated_user(request.session()).await else {
            info!("Anonymous authenticate request for {}, redirecting to login", client_id);
            let login = self.identity.login_url(&self.current_url(request));
            return Ok(Some(OidcResponse::Login(login)));
        };

        let authorisation_request = AuthorisationRequest::new(client_id.clone(), request.query().to_vec());
        let token = self
            .nonce
            .create(request.session(), user.sub(), AUTHORIZE_ACTION)?;
        let parameters = authorisation_request
            .forwarded_parameters(&self.provider.csrf().param_name, &token);
        let authorization_endpoint = self.engine.authorization_endpoint();

        if self
            .engine
            .is_consent_needed(&user, &authorisation_request)
            .await?
        {
            debug!("Consent needed for {} by {}", client_id, user.sub());
            let context = ConsentContext {
                client_id,
                client_name,
                subject: user.sub().clone(),
                action: authorization_endpoint,
                parameters,
            };
            let page = self.consent.render(&context).map_err(OidcError::Render)?;
            return Ok(Some(OidcResponse::Consent(page)));
        }

        let mut target = authorization_endpoint;
        target.query_pairs_mut().extend_pairs(parameters.iter());
        debug!("Forwarding {} to {}", client_id, target.path());
        Ok(Some(OidcResponse::Redirect(target)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use anyhow::anyhow;
    use mockall::mock;
    use time::OffsetDateTime;
    use url::Url;

    use oidc_frontend_types::client::ClientID;
    use oidc_frontend_types::subject::Subject;

    use crate::adapter::{
        ClientRegistry, ConsentContext, ConsentRenderer, EngineError, IdentityProvider,
        MockOAuth2Engine, PersistenceError,
    };
    use crate::configuration::csrf::CsrfConfiguration;
    use crate::configuration::{OpenIDProviderConfiguration, OpenIDProviderConfigurationBuilder};
    use crate::error::OidcError;
    use crate::handler::RequestHandler;
    use crate::request::OidcRequest;
    use crate::response::OidcResponse;
    use crate::services::authenticate::{AuthenticateService, AUTHORIZE_ACTION};
    use crate::services::nonce::NonceService;
    use crate::session::{AuthenticatedUser, SessionID};

    const AUTHENTICATE: &str = "/openid-connect/authenticate";
    const AUTHORIZE: &str = "https://example.org/api/openid-connect/authorize";
    const SECRET: &str = "csrf-secret";

    mock! {
        pub Registry {}
        #[async_trait::async_trait]
        impl ClientRegistry for Registry {
            async fn client_name(&self, client_id: &ClientID) -> Result<Option<String>, PersistenceError>;
        }
    }

    mock! {
        pub Identity {}
        #[async_trait::async_trait]
        impl IdentityProvider for Identity {
            async fn authenticated_user(&self, session: &SessionID) -> Option<AuthenticatedUser>;

            fn login_url(&self, return_to: &Url) -> Url;
        }
    }

    mock! {
        pub Renderer {}
        impl ConsentRenderer for Renderer {
            fn render(&self, context: &ConsentContext) -> anyhow::Result<String>;
        }
    }

    fn provider() -> Arc<OpenIDProviderConfiguration> {
        Arc::new(
            OpenIDProviderConfigurationBuilder::default()
                .issuer(oidc_frontend_types::issuer::Issuer::new("https://example.org/").unwrap())
                .csrf(CsrfConfiguration::with_secret(SECRET))
                .build()
                .unwrap(),
        )
    }

    fn known_clients() -> MockRegistry {
        let mut registry = MockRegistry::new();
        registry.expect_client_name().returning(|id| {
            Ok(match id.as_str() {
                "abc" => Some("Relying Party".to_owned()),
                "nameless" => Some(String::new()),
                _ => None,
            })
        });
        registry
    }

    fn logged_in(subject: &'static str) -> MockIdentity {
        let mut identity = MockIdentity::new();
        identity
            .expect_authenticated_user()
            .returning(move |_| {
                Some(AuthenticatedUser::new(
                    Subject::new(subject),
                    OffsetDateTime::now_utc(),
                ))
            });
        identity.expect_login_url().never();
        identity
    }

    fn engine(consent_needed: bool) -> MockOAuth2Engine {
        let mut engine = MockOAuth2Engine::new();
        engine
            .expect_authorization_endpoint()
            .returning(|| Url::parse(AUTHORIZE).unwrap());
        engine
            .expect_is_consent_needed()
            .returning(move |_, _| Ok(consent_needed));
        engine
    }

    fn service(
        engine: MockOAuth2Engine,
        registry: MockRegistry,
        identity: MockIdentity,
        renderer: MockRenderer,
    ) -> AuthenticateService {
        AuthenticateService::new(
            provider(),
            Arc::new(engine),
            Arc::new(registry),
            Arc::new(identity),
            Arc::new(renderer),
        )
    }

    fn untouched() -> (MockOAuth2Engine, MockIdentity, MockRenderer) {
        let mut engine = MockOAuth2Engine::new();
        engine.expect_is_consent_needed().never();
        engine.expect_authorization_endpoint().never();
        let mut identity = MockIdentity::new();
        identity.expect_authenticated_user().never();
        identity.expect_login_url().never();
        let mut renderer = MockRenderer::new();
        renderer.expect_render().never();
        (engine, identity, renderer)
    }

    #[tokio::test]
    async fn test_ignores_other_routes() {
        let (engine, identity, renderer) = untouched();
        let mut registry = MockRegistry::new();
        registry.expect_client_name().never();
        let service = service(engine, registry, identity, renderer);

        for path in ["/", "/openid-connect/authorize", "/api/openid-connect/authenticate"] {
            let request = OidcRequest::new(path, Some("client_id=abc"), SessionID::new());
            assert_eq!(None, service.handle(&request).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_unknown_or_missing_client_is_ignored() {
        let (engine, identity, renderer) = untouched();
        let service = service(engine, known_clients(), identity, renderer);

        for query in [None, Some("client_id="), Some("client_id=unknown123"), Some("client_id=nameless")] {
            let request = OidcRequest::new(AUTHENTICATE, query, SessionID::new());
            assert_eq!(None, service.handle(&request).await.unwrap());
            assert_eq!(None, service.handle(&request).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_registry_failure_is_ignored() {
        let (engine, identity, renderer) = untouched();
        let mut registry = MockRegistry::new();
        registry
            .expect_client_name()
            .times(1)
            .returning(|_| Err(PersistenceError::DB(anyhow!("connection refused"))));
        let service = service(engine, registry, identity, renderer);
        let request = OidcRequest::new(AUTHENTICATE, Some("client_id=abc"), SessionID::new());

        assert_eq!(None, service.handle(&request).await.unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_sent_to_login() {
        let (engine, _, renderer) = untouched();
        let mut identity = MockIdentity::new();
        identity.expect_authenticated_user().times(1).returning(|_| None);
        identity
            .expect_login_url()
            .times(1)
            .withf(|return_to| {
                return_to.as_str()
                    == "https://example.org/openid-connect/authenticate?client_id=abc&state=s+1"
            })
            .returning(|_| Url::parse("https://example.org/login").unwrap());
        let service = service(engine, known_clients(), identity, renderer);
        let request = OidcRequest::new(AUTHENTICATE, Some("client_id=abc&state=s%201"), SessionID::new());

        let response = service.handle(&request).await.unwrap();

        assert_eq!(
            Some(OidcResponse::Login(Url::parse("https://example.org/login").unwrap())),
            response
        );
    }

    #[tokio::test]
    async fn test_redirects_with_all_parameters_and_token() {
        let session = SessionID::new();
        let mut renderer = MockRenderer::new();
        renderer.expect_render().never();
        let service = service(engine(false), known_clients(), logged_in("alice"), renderer);
        let query = "client_id=abc&redirect_uri=https%3A%2F%2Frp.example%2Fcb";
        let request = OidcRequest::new(AUTHENTICATE, Some(query), session);

        let response = service.handle(&request).await.unwrap().unwrap();

        assert_eq!(302, response.status());
        let location = response.location().unwrap();
        assert!(location.as_str().starts_with(AUTHORIZE));
        let pairs: Vec<(String, String)> = location.query_pairs().into_owned().collect();
        let original: HashSet<(String, String)> = request.query().iter().cloned().collect();
        let forwarded: HashSet<(String, String)> = pairs.iter().cloned().collect();
        assert!(forwarded.is_superset(&original));
        assert_eq!(original.len() + 1, pairs.len());

        let tokens: Vec<&String> = pairs
            .iter()
            .filter(|(key, _)| key == "_csrf_token")
            .map(|(_, value)| value)
            .collect();
        assert_eq!(1, tokens.len());
        let nonce = NonceService::new(&CsrfConfiguration::with_secret(SECRET));
        assert!(nonce.verify(tokens[0], &session, &Subject::new("alice"), AUTHORIZE_ACTION));
    }

    #[tokio::test]
    async fn test_token_is_issued_to_the_signed_in_user() {
        let session = SessionID::new();
        let request = OidcRequest::new(AUTHENTICATE, Some("client_id=abc"), session);
        let as_alice = service(engine(false), known_clients(), logged_in("alice"), MockRenderer::new());
        let as_bob = service(engine(false), known_clients(), logged_in("bob"), MockRenderer::new());

        let alice_response = as_alice.handle(&request).await.unwrap().unwrap();
        let bob_response = as_bob.handle(&request).await.unwrap().unwrap();

        let token_of = |response: &OidcResponse| -> String {
            response
                .location()
                .unwrap()
                .query_pairs()
                .find(|(key, _)| key == "_csrf_token")
                .map(|(_, value)| value.into_owned())
                .unwrap()
        };
        let nonce = NonceService::new(&CsrfConfiguration::with_secret(SECRET));
        let alice_token = token_of(&alice_response);
        assert_ne!(alice_token, token_of(&bob_response));
        assert!(nonce.verify(&alice_token, &session, &Subject::new("alice"), AUTHORIZE_ACTION));
        assert!(!nonce.verify(&alice_token, &session, &Subject::new("bob"), AUTHORIZE_ACTION));
    }

    #[tokio::test]
    async fn test_replaces_inbound_token() {
        let session = SessionID::new();
        let service = service(engine(false), known_clients(), logged_in("alice"), MockRenderer::new());
        let request = OidcRequest::new(AUTHENTICATE, Some("client_id=abc&_csrf_token=forged"), session);

        let response = service.handle(&request).await.unwrap().unwrap();

        let location = response.location().unwrap();
        let tokens: Vec<String> = location
            .query_pairs()
            .filter(|(key, _)| key == "_csrf_token")
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(1, tokens.len());
        assert_ne!("forged", tokens[0]);
    }

    #[tokio::test]
    async fn test_renders_consent_when_needed() {
        let session = SessionID::new();
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .times(1)
            .withf(|context| {
                context.client_name == "Relying Party"
                    && context.subject == Subject::new("alice")
                    && context.action.as_str() == AUTHORIZE
                    && context.parameters.len() == 2
                    && context.parameters[1].0 == "_csrf_token"
            })
            .returning(|context| Ok(format!("<h1>Authorize {}</h1>", context.client_name)));
        let service = service(engine(true), known_clients(), logged_in("alice"), renderer);
        let request = OidcRequest::new(AUTHENTICATE, Some("client_id=abc"), session);

        let response = service.handle(&request).await.unwrap().unwrap();

        assert_eq!(200, response.status());
        assert_eq!(None, response.location());
        assert_eq!(
            OidcResponse::Consent("<h1>Authorize Relying Party</h1>".to_owned()),
            response
        );
    }

    #[tokio::test]
    async fn test_engine_failure_is_reported() {
        let session = SessionID::new();
        let mut engine = MockOAuth2Engine::new();
        engine
            .expect_authorization_endpoint()
            .returning(|| Url::parse(AUTHORIZE).unwrap());
        engine
            .expect_is_consent_needed()
            .returning(|_, _| Err(EngineError::Internal(anyhow!("storage offline"))));
        let service = service(engine, known_clients(), logged_in("alice"), MockRenderer::new());
        let request = OidcRequest::new(AUTHENTICATE, Some("client_id=abc"), session);

        let result = service.handle(&request).await;

        assert!(matches!(result, Err(OidcError::Engine(_))));
    }
}
