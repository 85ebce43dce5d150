use std::error::Error;

use hmac::digest::InvalidLength;
use thiserror::Error;

use oidc_frontend_types::discovery::OIDCProviderMetadataBuilderError;

use crate::adapter::EngineError;

/// Failure while producing a response for a request that was matched.
#[derive(Debug, Error)]
pub enum OidcError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Error rendering consent page: {}", .0)]
    Render(#[source] anyhow::Error),
    #[error("Error serializing response: {}", .0)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid url: {}", .0)]
    Url(#[from] url::ParseError),
    #[error("Error building provider metadata: {}", .0)]
    Metadata(#[from] OIDCProviderMetadataBuilderError),
    #[error("Error signing anti-forgery token: {}", .0)]
    AntiForgery(#[from] InvalidLength),
}

pub fn build_report<E>(err: &E) -> String
where
    E: std::error::Error,
    E: Send + Sync,
{
    let mut count = 0;
    let mut current_err: &dyn Error = err;
    let mut report = format!("[ERROR] - {}", current_err);
    if current_err.source().is_some() {
        report.push_str("\nCaused by:");
    }
    while let Some(cause) = current_err.source() {
        count += 1;
        report.push_str(&format!("\n    {}: {}", count, cause));
        current_err = cause;
    }
    report
}
