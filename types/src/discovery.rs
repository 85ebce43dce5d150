use derive_builder::Builder;
use serde::Serialize;
use serde_with::skip_serializing_none;
use url::Url;

use crate::issuer::Issuer;

/// OpenID Provider Metadata published at `/.well-known/openid-configuration`.
#[skip_serializing_none]
#[derive(Serialize, Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct OIDCProviderMetadata {
    issuer: Issuer,
    authorization_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
    jwks_uri: Url,
    scopes_supported: Vec<String>,
    response_types_supported: Vec<String>,
    id_token_signing_alg_values_supported: Vec<String>,
    #[builder(default)]
    subject_types_supported: Option<Vec<String>>,
}

impl OIDCProviderMetadata {
    pub fn issuer(&self) -> &Issuer {
        &self.issuer
    }

    pub fn jwks_uri(&self) -> &Url {
        &self.jwks_uri
    }
}
