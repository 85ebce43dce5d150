pub mod adapter;
pub mod authorisation_request;
pub mod configuration;
pub mod error;
pub mod handler;
pub mod keystore;
pub mod request;
pub mod response;
pub mod services;
pub mod session;
