//! Error types and result aliases.

use thiserror::Error;

/// Invalid encoding configuration, reported when the storage is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("encoding options: must contain an encoder function")]
    MissingEncoder,

    #[error("encoding options: must contain a decoder function")]
    MissingDecoder,

    #[error("encoding options: encoderParams must be an array")]
    EncoderParamsNotSequence,

    #[error("encoding options: decoderParams must be an array")]
    DecoderParamsNotSequence,
}

/// Errors returned while configuring storage or committing a session.
///
/// Reading a session never fails; see [`CookieSessionStorage::get_session`].
///
/// [`CookieSessionStorage::get_session`]: crate::CookieSessionStorage::get_session
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The encoder failed. The underlying cause is not retained.
    #[error("error in encoding, check the encoder function")]
    Encode,

    /// The decoder failed. The underlying cause is not retained.
    #[error("error in decoding, check the decoder function")]
    Decode,

    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("encoded session cookie exceeds max_cookie_bytes ({size} > {max})")]
    CookieTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
