use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub mod jwk_set;

/// Base64url without padding, as required for JWK members (RFC 7518 §6.3).
pub fn base64url_encode<T: AsRef<[u8]>>(bytes: T) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn base64url_decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}
