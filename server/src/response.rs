use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use oidc_frontend_core::error::{build_report, OidcError};
use oidc_frontend_core::response::OidcResponse;

const JSON_CONTENT_TYPE: &str = "application/json";

pub(crate) struct OidcResponseWrapper(pub OidcResponse);

impl IntoResponse for OidcResponseWrapper {
    fn into_response(self) -> Response {
        match self.0 {
            OidcResponse::Json(body) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, JSON_CONTENT_TYPE),
                    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                ],
                body,
            )
                .into_response(),
            OidcResponse::Redirect(url) | OidcResponse::Login(url) => {
                (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
            }
            OidcResponse::Consent(page) => Html(page).into_response(),
        }
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub(crate) struct OidcErrorResponse(#[from] OidcError);

impl IntoResponse for OidcErrorResponse {
    fn into_response(self) -> Response {
        error!("{}", build_report(&self.0));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "server_error",
                "error_description": "The authorization server encountered an unexpected condition",
            })),
        )
            .into_response()
    }
}
