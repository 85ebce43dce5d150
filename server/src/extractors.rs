use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

use oidc_frontend_core::session::SessionID;

pub const SESSION_KEY: &str = "oidc-session";

/// Session of the current caller, inserted by the session manager layer.
#[derive(Debug, Clone, Copy)]
pub struct SessionHolder(SessionID);

impl SessionHolder {
    pub fn new(session: SessionID) -> Self {
        Self(session)
    }

    pub fn session_id(&self) -> SessionID {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionHolder
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHolder>()
            .copied()
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session manager layer not configured",
            ))
    }
}
