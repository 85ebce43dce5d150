pub use oidc_frontend_core::configuration::{csrf, environment, provider, routes};
pub use oidc_frontend_core::handler::Collaborators;

pub mod extractors;
pub mod middleware;
mod response;
pub mod server;
