use rand::RngCore;
use time::Duration;

pub const DEFAULT_PARAM_NAME: &str = "_csrf_token";
const DEFAULT_SECRET_LENGTH: usize = 32;

/// Anti-forgery token settings.
#[derive(Clone)]
pub struct CsrfConfiguration {
    pub param_name: String,
    pub secret: Vec<u8>,
    pub lifetime: Duration,
}

impl CsrfConfiguration {
    pub fn with_secret<S: Into<Vec<u8>>>(secret: S) -> Self {
        CsrfConfiguration {
            secret: secret.into(),
            ..CsrfConfiguration::default()
        }
    }
}

impl std::fmt::Debug for CsrfConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfConfiguration")
            .field("param_name", &self.param_name)
            .field("secret", &"<redacted>")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl Default for CsrfConfiguration {
    fn default() -> Self {
        let mut secret = vec![0u8; DEFAULT_SECRET_LENGTH];
        rand::thread_rng().fill_bytes(&mut secret);
        CsrfConfiguration {
            param_name: DEFAULT_PARAM_NAME.to_owned(),
            secret,
            lifetime: Duration::days(1),
        }
    }
}
