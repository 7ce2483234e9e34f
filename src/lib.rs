//! Cookie-only session storage.
//!
//! The whole session lives in a single cookie value. On write the session is serialized to JSON,
//! optionally passed through a reversible encoding, then signed with HMAC-SHA256 under the first
//! configured secret. On read the value is verified against every configured secret (so secrets
//! can be rotated), decoded and parsed. Anything that fails along the way is treated as if no
//! cookie had been sent at all: the caller simply gets an empty session.
//!
//! # Security
//! Signing prevents tampering but the payload is **not encrypted**: anyone holding the cookie can
//! read it, even with base64 encoding enabled. Supply a custom encoder/decoder pair that encrypts
//! if the session carries anything confidential.
//!
//! Without any secret configured the cookie is not signed at all. A client can then edit it
//! freely, which is only acceptable for testing and debugging.

mod compare;
mod config;
pub mod encoding;
mod error;
pub mod layer;
mod session;
pub mod signing;
mod source;
mod storage;

pub use tower_cookies::cookie::SameSite;

pub use crate::compare::timing_safe_eq;
pub use crate::config::CookieSessionConfig;
pub use crate::encoding::{CustomEncodingOptions, Encoder, EncodingOptions};
pub use crate::error::{ConfigError, Error, Result};
pub use crate::layer::CookieSessionLayer;
pub use crate::session::{CookieSession, Session};
pub use crate::signing::{Secret, sign, unsign};
pub use crate::source::CookieSource;
pub use crate::storage::CookieSessionStorage;
