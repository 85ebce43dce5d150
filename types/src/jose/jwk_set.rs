use serde::{Deserialize, Serialize};

use crate::jose::base64url_encode;

pub const RSA_KEY_TYPE: &str = "RSA";
pub const SIGNATURE_USE: &str = "sig";
pub const RS256: &str = "RS256";

/// Public RSA signing key in JWK form.
///
/// Members are declared in the order they are published.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RsaJwk {
    kty: String,
    #[serde(rename = "use")]
    key_use: String,
    alg: String,
    n: String,
    e: String,
}

impl RsaJwk {
    /// Builds an RS256 signing key from big-endian modulus and exponent bytes.
    pub fn signing_key<N: AsRef<[u8]>, E: AsRef<[u8]>>(modulus: N, exponent: E) -> Self {
        Self {
            kty: RSA_KEY_TYPE.to_owned(),
            key_use: SIGNATURE_USE.to_owned(),
            alg: RS256.to_owned(),
            n: base64url_encode(modulus),
            e: base64url_encode(exponent),
        }
    }

    pub fn n(&self) -> &str {
        &self.n
    }

    pub fn e(&self) -> &str {
        &self.e
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct JwkSet {
    keys: Vec<RsaJwk>,
}

impl JwkSet {
    pub fn new(keys: Vec<RsaJwk>) -> Self {
        JwkSet { keys }
    }
}
