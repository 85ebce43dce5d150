pub mod authenticate;
pub mod discovery;
pub mod jwks;
pub mod nonce;
