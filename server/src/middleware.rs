use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use tower::{Layer, Service};
use tower_cookies::{Cookie, Cookies, Key};
use tracing::{error, warn};

use oidc_frontend_core::handler::HandlerChain;
use oidc_frontend_core::request::OidcRequest;
use oidc_frontend_core::session::SessionID;

use crate::extractors::{SessionHolder, SESSION_KEY};
use crate::response::{OidcErrorResponse, OidcResponseWrapper};

#[derive(Clone)]
pub struct SessionManager<S> {
    inner: S,
    key: Arc<Key>,
    secure: bool,
}

impl<S> SessionManager<S> {
    pub fn new(inner: S, key: Arc<Key>, secure: bool) -> Self {
        Self { inner, key, secure }
    }
}

fn load_session(cookies: &Cookies, key: &Key) -> Option<SessionID> {
    let cookie = cookies.signed(key).get(SESSION_KEY)?;
    match SessionID::from_str(cookie.value()) {
        Ok(session) => Some(session),
        Err(err) => {
            warn!("Discarding malformed session cookie: {}", err);
            None
        }
    }
}

impl<S> Service<Request<Body>> for SessionManager<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut service = std::mem::replace(&mut self.inner, clone);

        let key = self.key.clone();
        let secure = self.secure;
        Box::pin(async move {
            let Some(cookies) = req.extensions().get::<Cookies>().cloned() else {
                error!("tower-cookies must be configured before the session manager");
                return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            };
            let existing = load_session(&cookies, &key);
            let session = existing.unwrap_or_default();
            req.extensions_mut().insert(SessionHolder::new(session));

            let res = service.call(req).await?;
            if existing.is_none() {
                let cookie = Cookie::build((SESSION_KEY, session.to_string()))
                    .path("/")
                    .http_only(true)
                    .secure(secure);
                cookies.signed(&key).add(cookie.build());
            }
            Ok(res)
        })
    }
}

/// Issues the `oidc-session` cookie, signed with `key`.
#[derive(Clone)]
pub struct SessionManagerLayer {
    key: Arc<Key>,
    secure: bool,
}

impl SessionManagerLayer {
    pub fn signed(key: Key) -> Self {
        Self {
            key: Arc::new(key),
            secure: false,
        }
    }

    pub fn secure(self, secure: bool) -> Self {
        Self { secure, ..self }
    }
}

impl<S> Layer<S> for SessionManagerLayer {
    type Service = SessionManager<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionManager::new(inner, self.key.clone(), self.secure)
    }
}

/// Runs the OIDC handler chain ahead of the wrapped service.
#[derive(Clone)]
pub struct OidcService<S> {
    inner: S,
    chain: Arc<HandlerChain>,
}

impl<S> OidcService<S> {
    pub fn new(inner: S, chain: Arc<HandlerChain>) -> Self {
        Self { inner, chain }
    }
}

impl<S> Service<Request<Body>> for OidcService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut service = std::mem::replace(&mut self.inner, clone);

        let chain = self.chain.clone();
        Box::pin(async move {
            let inspected = req.method() == Method::GET || req.method() == Method::HEAD;
            if !inspected || chain.is_empty() {
                return service.call(req).await;
            }
            let session = req
                .extensions()
                .get::<SessionHolder>()
                .map(SessionHolder::session_id)
                .unwrap_or_default();
            let request = OidcRequest::new(req.uri().path(), req.uri().query(), session);
            match chain.dispatch(&request).await {
                Ok(Some(response)) => Ok(OidcResponseWrapper(response).into_response()),
                Ok(None) => service.call(req).await,
                Err(err) => Ok(OidcErrorResponse::from(err).into_response()),
            }
        })
    }
}

#[derive(Clone)]
pub struct OidcLayer {
    chain: Arc<HandlerChain>,
}

impl OidcLayer {
    pub fn new(chain: HandlerChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }
}

impl<S> Layer<S> for OidcLayer {
    type Service = OidcService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OidcService::new(inner, self.chain.clone())
    }
}
