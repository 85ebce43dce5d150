use url::Url;

/// Outcome of a handled request. Returning one of these ends the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OidcResponse {
    /// Public JSON document, served with `200` and `Access-Control-Allow-Origin: *`.
    Json(String),
    /// `302` to the OAuth2 engine.
    Redirect(Url),
    /// `302` to the host login flow.
    Login(Url),
    /// Consent page markup, served with `200`.
    Consent(String),
}

impl OidcResponse {
    pub fn status(&self) -> u16 {
        match self {
            OidcResponse::Json(_) | OidcResponse::Consent(_) => 200,
            OidcResponse::Redirect(_) | OidcResponse::Login(_) => 302,
        }
    }

    pub fn location(&self) -> Option<&Url> {
        match self {
            OidcResponse::Redirect(url) | OidcResponse::Login(url) => Some(url),
            OidcResponse::Json(_) | OidcResponse::Consent(_) => None,
        }
    }
}
