pub mod client;
pub mod discovery;
pub mod issuer;
pub mod jose;
pub mod subject;
