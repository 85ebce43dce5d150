use std::fmt::{Debug, Formatter};

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

use oidc_frontend_types::jose::jwk_set::{JwkSet, RsaJwk};

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid RSA public key: {}", .0)]
    InvalidPublicKey(#[source] rsa::pkcs1::Error),
    #[error("Invalid RSA private key: {}", .0)]
    InvalidPrivateKey(#[source] rsa::pkcs1::Error),
    #[error("Private key does not match the public key")]
    Mismatch,
}

/// Signing key pair in PEM form, immutable for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    public_key: String,
    private_key: String,
}

impl KeyPair {
    pub fn new<P: Into<String>, S: Into<String>>(public_key: P, private_key: S) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Accepts both SPKI (`BEGIN PUBLIC KEY`) and PKCS#1 (`BEGIN RSA PUBLIC KEY`).
    pub fn rsa_public_key(&self) -> Result<RsaPublicKey, KeyError> {
        let pem = self.public_key.trim();
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(KeyError::InvalidPublicKey)
    }

    pub fn rsa_private_key(&self) -> Result<RsaPrivateKey, KeyError> {
        let pem = self.private_key.trim();
        RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(KeyError::InvalidPrivateKey)
    }

    /// Checks both halves parse and belong together.
    pub fn validate(&self) -> Result<(), KeyError> {
        let public_key = self.rsa_public_key()?;
        let private_key = self.rsa_private_key()?;
        if private_key.to_public_key() != public_key {
            return Err(KeyError::Mismatch);
        }
        Ok(())
    }

    pub fn jwk(&self) -> Result<RsaJwk, KeyError> {
        let key = self.rsa_public_key()?;
        Ok(RsaJwk::signing_key(
            key.n().to_bytes_be(),
            key.e().to_bytes_be(),
        ))
    }

    pub fn jwk_set(&self) -> Result<JwkSet, KeyError> {
        Ok(JwkSet::new(vec![self.jwk()?]))
    }
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Resolves the key pair from raw configuration values.
#[derive(Debug, Default, Clone)]
pub struct KeyProvider {
    public_key: Option<String>,
    private_key: Option<String>,
}

impl KeyProvider {
    pub fn new(public_key: Option<String>, private_key: Option<String>) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    /// `None` when either half is missing or blank.
    pub fn get_key_pair(&self) -> Option<KeyPair> {
        let public_key = non_blank(self.public_key.as_deref())?;
        let private_key = non_blank(self.private_key.as_deref())?;
        Some(KeyPair::new(public_key, private_key))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|it| !it.trim().is_empty())
}
