//! HMAC-SHA256 signing of cookie values with ordered secret rotation.
//!
//! A signed value has the form `s:<value>.<hex-signature>`. The `s:` prefix can be suppressed with
//! `omit_prefix`. Verification accepts a signature made with any configured secret, so a new
//! secret can be put first for signing while older ones keep verifying outstanding cookies.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::compare::timing_safe_eq;

type HmacSha256 = Hmac<Sha256>;

/// Prefix tagging a value as signed.
pub const SIGNED_PREFIX: &str = "s:";

/// Key material used to compute the cookie signature.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&[u8]> for Secret {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

fn signature(value: &str, secret: &Secret) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(value.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Signs `value` with `secret`, producing `[s:]<value>.<hex-signature>`.
#[must_use]
pub fn sign(value: &str, secret: &Secret, omit_prefix: bool) -> String {
    let prefix = if omit_prefix { "" } else { SIGNED_PREFIX };
    format!("{prefix}{value}.{}", signature(value, secret))
}

/// Verifies `signed` against each secret in order and returns the inner value on the first match.
///
/// Malformed input and a signature that no secret produced are both reported as `None`.
#[must_use]
pub fn unsign<'a>(signed: &'a str, secrets: &[Secret], omit_prefix: bool) -> Option<&'a str> {
    let data = if omit_prefix {
        signed
    } else {
        signed.strip_prefix(SIGNED_PREFIX).unwrap_or(signed)
    };

    let (value, provided) = data.split_once('.')?;
    if value.is_empty() || provided.is_empty() {
        return None;
    }

    secrets
        .iter()
        .any(|secret| timing_safe_eq(provided.as_bytes(), signature(value, secret).as_bytes()))
        .then_some(value)
}
