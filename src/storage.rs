//! The session value trust pipeline.
//!
//! Reading runs `raw → unsign → decode → parse`; writing runs `serialize → encode → sign`.
//! Every read failure collapses into an empty session, so a forged, corrupted or stale cookie
//! behaves exactly like a missing one.

use thiserror::Error;
use tower_cookies::{Cookie, Cookies};

use crate::{
    config::CookieSessionConfig,
    encoding::Encoder,
    error::{Error, Result},
    session::CookieSession,
    signing,
    source::CookieSource,
};

/// Stage at which reading a cookie value failed. Never reaches the client.
#[derive(Debug, Error)]
pub(crate) enum ReadError {
    #[error("signature did not verify")]
    Unsign,

    #[error("payload did not decode")]
    Decode,

    #[error("payload is not a JSON object: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ReadError {
    pub(crate) fn stage(&self) -> &'static str {
        match self {
            Self::Unsign => "unsign",
            Self::Decode => "decode",
            Self::Parse(_) => "parse",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieSessionStorage {
    config: CookieSessionConfig,
    encoder: Encoder,
}

impl CookieSessionStorage {
    /// Builds the storage, rejecting invalid encoding options up front.
    pub fn new(config: CookieSessionConfig) -> Result<Self> {
        let encoder = Encoder::configure(config.encoding.clone())?;
        Ok(Self { config, encoder })
    }

    pub fn config(&self) -> &CookieSessionConfig {
        &self.config
    }

    /// Reads the session cookie from `source`. Never fails: anything that does not verify, decode
    /// and parse yields an empty session.
    pub fn get_session<S: CookieSource + ?Sized>(&self, source: &S) -> CookieSession {
        self.session_from_value(source.cookie_value(&self.config.name).as_deref())
    }

    /// Like [`get_session`](Self::get_session), starting from the raw cookie value.
    pub fn session_from_value(&self, raw: Option<&str>) -> CookieSession {
        match raw.filter(|raw| !raw.is_empty()) {
            Some(raw) => self.try_session_from_value(raw).unwrap_or_else(|err| {
                tracing::debug!(stage = err.stage(), err = %err, "discarding session cookie");
                CookieSession::new()
            }),
            None => CookieSession::new(),
        }
    }

    pub(crate) fn try_session_from_value(
        &self,
        raw: &str,
    ) -> std::result::Result<CookieSession, ReadError> {
        let unsigned = if self.config.secrets.is_empty() {
            raw
        } else {
            signing::unsign(raw, &self.config.secrets, self.config.omit_sign_prefix)
                .ok_or(ReadError::Unsign)?
        };

        let decoded = if self.encoder.is_enabled() {
            self.encoder
                .decode(unsigned)
                .map_err(|_| ReadError::Decode)?
        } else {
            unsigned.to_owned()
        };

        Ok(serde_json::from_str(&decoded)?)
    }

    /// Serializes, encodes and signs `session` into the raw cookie value.
    pub fn cookie_value(&self, session: &CookieSession) -> Result<String> {
        let mut value = session.to_json()?;

        if self.encoder.is_enabled() {
            value = self.encoder.encode(&value)?;
        }

        if let Some(secret) = self.config.secrets.first() {
            value = signing::sign(&value, secret, self.config.omit_sign_prefix);
        }

        // Browsers cap the `name=value` pair as sent, after percent-encoding.
        let size = Cookie::new(&*self.config.name, value.as_str())
            .encoded()
            .to_string()
            .len();
        if size > self.config.max_cookie_bytes {
            return Err(Error::CookieTooLarge {
                size,
                max: self.config.max_cookie_bytes,
            });
        }

        Ok(value)
    }

    /// The session cookie with all configured attributes.
    pub fn session_cookie(&self, session: &CookieSession) -> Result<Cookie<'static>> {
        Ok(self
            .config
            .build_cookie(self.cookie_value(session)?, false))
    }

    /// A cookie carrying `session` that the client discards immediately.
    pub fn expired_cookie(&self, session: &CookieSession) -> Result<Cookie<'static>> {
        Ok(self.config.build_cookie(self.cookie_value(session)?, true))
    }

    /// Header-ready `Set-Cookie` value for `session`.
    pub fn commit_session(&self, session: &CookieSession) -> Result<String> {
        Ok(self.session_cookie(session)?.encoded().to_string())
    }

    /// Header-ready `Set-Cookie` value that expires the session cookie now.
    pub fn destroy_session(&self, session: &CookieSession) -> Result<String> {
        Ok(self.expired_cookie(session)?.encoded().to_string())
    }

    /// Writes `session` into a live cookie jar.
    pub fn set_cookie(&self, cookies: &Cookies, session: &CookieSession) -> Result<()> {
        cookies.add(self.session_cookie(session)?);
        Ok(())
    }

    /// Writes an already expired session cookie into a live cookie jar.
    pub fn delete_cookie(&self, cookies: &Cookies, session: &CookieSession) -> Result<()> {
        cookies.add(self.expired_cookie(session)?);
        Ok(())
    }

    pub(crate) fn remove_cookie(&self, cookies: &Cookies) {
        let mut cookie = Cookie::new(self.config.name.clone(), "");
        self.config.apply_removal_attributes(&mut cookie);
        cookies.remove(cookie);
    }
}
