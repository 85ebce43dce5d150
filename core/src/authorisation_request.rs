use oidc_frontend_types::client::ClientID;

/// Authorization request addressed to the authenticate route. Everything but
/// the client id is passed through to the OAuth2 engine untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorisationRequest {
    client_id: ClientID,
    parameters: Vec<(String, String)>,
}

impl AuthorisationRequest {
    pub fn new(client_id: ClientID, parameters: Vec<(String, String)>) -> Self {
        Self {
            client_id,
            parameters,
        }
    }

    pub fn client_id(&self) -> &ClientID {
        &self.client_id
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Original parameters followed by exactly one `token_param`. Any inbound
    /// value under that name is discarded.
    pub fn forwarded_parameters(&self, token_param: &str, token: &str) -> Vec<(String, String)> {
        self.parameters
            .iter()
            .filter(|(key, _)| key != token_param)
            .cloned()
            .chain(std::iter::once((token_param.to_owned(), token.to_owned())))
            .collect()
    }
}
