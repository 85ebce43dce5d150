use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};

use oidc_frontend_types::jose::base64url_encode;
use oidc_frontend_types::subject::Subject;

use crate::configuration::csrf::CsrfConfiguration;
use crate::session::SessionID;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_BYTES: usize = 12;

/// Anti-forgery tokens bound to a session and the user signed in on it.
///
/// A token is tied to a time window of half the configured lifetime and is
/// accepted during its own window and the following one.
pub struct NonceService {
    secret: Vec<u8>,
    lifetime: Duration,
}

impl NonceService {
    pub fn new(config: &CsrfConfiguration) -> Self {
        Self {
            secret: config.secret.clone(),
            lifetime: config.lifetime,
        }
    }

    pub fn create(
        &self,
        session: &SessionID,
        subject: &Subject,
        action: &str,
    ) -> Result<String, InvalidLength> {
        self.create_at(session, subject, action, OffsetDateTime::now_utc())
    }

    pub fn verify(&self, token: &str, session: &SessionID, subject: &Subject, action: &str) -> bool {
        self.verify_at(token, session, subject, action, OffsetDateTime::now_utc())
    }

    fn create_at(
        &self,
        session: &SessionID,
        subject: &Subject,
        action: &str,
        now: OffsetDateTime,
    ) -> Result<String, InvalidLength> {
        self.token(self.tick(now), session, subject, action)
    }

    fn verify_at(
        &self,
        token: &str,
        session: &SessionID,
        subject: &Subject,
        action: &str,
        now: OffsetDateTime,
    ) -> bool {
        let tick = self.tick(now);
        [tick, tick - 1].into_iter().any(|it| {
            self.token(it, session, subject, action)
                .map(|expected| expected.as_bytes().ct_eq(token.as_bytes()).into())
                .unwrap_or(false)
        })
    }

    fn tick(&self, now: OffsetDateTime) -> i64 {
        let window = (self.lifetime.whole_seconds() / 2).max(1);
        now.unix_timestamp().div_euclid(window) + 1
    }

    fn token(
        &self,
        tick: i64,
        session: &SessionID,
        subject: &Subject,
        action: &str,
    ) -> Result<String, InvalidLength> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)?;
        mac.update(&tick.to_be_bytes());
        mac.update(action.as_bytes());
        mac.update(&[0]);
        mac.update(session.to_string().as_bytes());
        mac.update(&[0]);
        mac.update(subject.to_string().as_bytes());
        let digest = mac.finalize().into_bytes();
        Ok(base64url_encode(&digest[..TOKEN_BYTES]))
    }
}
