use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use lazy_static::lazy_static;
use serde::Deserialize;
use tera::{Context, Tera};
use tracing::{info, warn};
use url::Url;

use oidc_frontend_core::adapter::in_memory::{
    InMemoryClientRegistry, InMemoryEngine, InMemoryIdentity,
};
use oidc_frontend_core::adapter::{IdentityProvider, OAuth2Engine};
use oidc_frontend_core::configuration::OpenIDProviderConfiguration;
use oidc_frontend_core::services::authenticate::AUTHORIZE_ACTION;
use oidc_frontend_core::services::nonce::NonceService;
use oidc_frontend_server::extractors::SessionHolder;
use oidc_frontend_server::server::OidcServer;
use oidc_frontend_server::Collaborators;
use oidc_frontend_types::client::ClientID;
use oidc_frontend_types::issuer::Issuer;
use oidc_frontend_types::subject::Subject;

use crate::consent::TeraConsent;

mod consent;

const BIND_ADDR_VAR: &str = "OIDC_BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEMO_CLIENT_ID: &str = "demo-client";

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("example/static/pages/**/*") {
            Ok(t) => t,
            Err(e) => {
                println!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera
    };
}

#[derive(Clone)]
struct DemoState {
    issuer: Issuer,
    csrf_param: String,
    nonce: Arc<NonceService>,
    identity: InMemoryIdentity,
    engine: Arc<InMemoryEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = OpenIDProviderConfiguration::from_env()?;
    let addr = SocketAddr::from_str(
        &std::env::var(BIND_ADDR_VAR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned()),
    )?;

    let clients = InMemoryClientRegistry::new();
    clients.register(ClientID::from_str(DEMO_CLIENT_ID)?, "Demo relying party");
    info!(
        "Try {}?client_id={}&redirect_uri=http://localhost:8000/callback",
        config.issuer().join(&config.routes().authenticate())?,
        DEMO_CLIENT_ID
    );

    let identity = InMemoryIdentity::new(config.issuer().join("login")?);
    let engine = Arc::new(InMemoryEngine::new(&config)?);
    let state = DemoState {
        issuer: config.issuer().clone(),
        csrf_param: config.csrf().param_name.clone(),
        nonce: Arc::new(NonceService::new(config.csrf())),
        identity: identity.clone(),
        engine: engine.clone(),
    };
    let authorize_path = engine.authorization_endpoint().path().to_owned();

    let app = Router::new()
        .route("/login", get(login_page).post(login))
        .route(&authorize_path, get(authorize))
        .with_state(state);

    let collaborators = Collaborators {
        engine,
        clients: Arc::new(clients),
        identity: Arc::new(identity),
        consent: Arc::new(TeraConsent),
    };
    OidcServer::new(config, collaborators)
        .with_router(app)
        .run(addr)
        .await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct LoginPageQuery {
    #[serde(default)]
    redirect_to: String,
}

async fn login_page(Query(query): Query<LoginPageQuery>) -> Response {
    let mut context = Context::new();
    context.insert("redirect_to", &query.redirect_to);
    render("login.html", &context)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    redirect_to: String,
}

async fn login(
    State(state): State<DemoState>,
    session: SessionHolder,
    Form(req): Form<LoginRequest>,
) -> Response {
    if req.username.trim().is_empty() {
        return (StatusCode::UNAUTHORIZED, "Username required").into_response();
    }
    state
        .identity
        .login(session.session_id(), Subject::new(req.username.trim()));

    let target = Url::parse(&req.redirect_to)
        .ok()
        .filter(|url| url.origin() == state.issuer.inner_ref().origin());
    match target {
        Some(target) => Redirect::to(target.as_str()).into_response(),
        None => Redirect::to(state.issuer.base_path()).into_response(),
    }
}

/// Stand-in for the engine's authorize endpoint: checks the anti-forgery token
/// and records consent.
async fn authorize(
    State(state): State<DemoState>,
    session: SessionHolder,
    Query(parameters): Query<Vec<(String, String)>>,
) -> Response {
    let value_of = |name: &str| parameter(&parameters, name);
    let session_id = session.session_id();
    let Some(user) = state.identity.authenticated_user(&session_id).await else {
        return (StatusCode::UNAUTHORIZED, "Not signed in").into_response();
    };
    let token_valid = value_of(&state.csrf_param)
        .map(|token| state.nonce.verify(token, &session_id, user.sub(), AUTHORIZE_ACTION))
        .unwrap_or(false);
    if !token_valid {
        warn!("Rejecting authorize request with invalid anti-forgery token");
        return (StatusCode::FORBIDDEN, "Invalid anti-forgery token").into_response();
    }
    let Some(client_id) = value_of("client_id").and_then(|id| ClientID::from_str(id).ok()) else {
        return (StatusCode::BAD_REQUEST, "Missing client_id").into_response();
    };
    if value_of("consent") == Some("allow") {
        info!("{} granted access to {}", user.sub(), client_id);
        state.engine.grant(user.sub().clone(), client_id.clone());
    }

    let mut context = Context::new();
    context.insert("subject", user.sub());
    context.insert("signed_in_at", &user.auth_time().to_string());
    context.insert("client_id", client_id.as_str());
    context.insert("parameters", &parameters);
    render("authorized.html", &context)
}

fn parameter<'a>(parameters: &'a [(String, String)], name: &str) -> Option<&'a str> {
    parameters
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn render(template: &str, context: &Context) -> Response {
    match TEMPLATES.render(template, context) {
        Ok(page) => Html(page).into_response(),
        Err(err) => {
            warn!("Error rendering {}: {}", template, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
