pub use provider::*;

pub mod csrf;
pub mod environment;
pub mod provider;
pub mod routes;
