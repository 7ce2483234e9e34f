//! Reversible transform applied to the serialized session before signing.
//!
//! Encoding is disabled by default. [`EncodingOptions::Base64`] applies standard base64 to the
//! UTF-8 bytes of the payload. [`EncodingOptions::Custom`] plugs in an arbitrary encoder/decoder
//! pair, each called with the value followed by its configured positional parameters.
//!
//! Encoding is obfuscation, not encryption, unless the custom pair encrypts.

use std::{fmt, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;

use crate::error::{ConfigError, Error, Result};

/// Error returned by a custom transform. Its detail never leaves the [`Encoder`].
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// Output of a custom transform.
pub type TransformResult = std::result::Result<String, TransformError>;

type TransformFn = dyn Fn(&str, &[Value]) -> TransformResult + Send + Sync;

/// A user supplied text transform, called as `f(value, params)`.
#[derive(Clone)]
pub struct Transform(Arc<TransformFn>);

impl Transform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &[Value]) -> TransformResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    fn call(&self, value: &str, params: &[Value]) -> TransformResult {
        (self.0)(value, params)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// Encoder/decoder pair and their positional parameters, validated by [`Encoder::configure`].
#[derive(Debug, Clone, Default)]
pub struct CustomEncodingOptions {
    encoder: Option<Transform>,
    decoder: Option<Transform>,
    encoder_params: Option<Value>,
    decoder_params: Option<Value>,
}

impl CustomEncodingOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_encoder<F>(mut self, encoder: F) -> Self
    where
        F: Fn(&str, &[Value]) -> TransformResult + Send + Sync + 'static,
    {
        self.encoder = Some(Transform::new(encoder));
        self
    }

    #[must_use]
    pub fn with_decoder<F>(mut self, decoder: F) -> Self
    where
        F: Fn(&str, &[Value]) -> TransformResult + Send + Sync + 'static,
    {
        self.decoder = Some(Transform::new(decoder));
        self
    }

    /// Extra arguments passed to every encoder call. Must be a JSON array.
    #[must_use]
    pub fn with_encoder_params<P: Into<Value>>(mut self, params: P) -> Self {
        self.encoder_params = Some(params.into());
        self
    }

    /// Extra arguments passed to every decoder call. Must be a JSON array.
    #[must_use]
    pub fn with_decoder_params<P: Into<Value>>(mut self, params: P) -> Self {
        self.decoder_params = Some(params.into());
        self
    }
}

/// How the serialized session is transformed before it is signed.
#[derive(Debug, Clone, Default)]
pub enum EncodingOptions {
    #[default]
    Disabled,
    Base64,
    Custom(CustomEncodingOptions),
}

impl From<bool> for EncodingOptions {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Base64 } else { Self::Disabled }
    }
}

impl From<CustomEncodingOptions> for EncodingOptions {
    fn from(options: CustomEncodingOptions) -> Self {
        Self::Custom(options)
    }
}

#[derive(Debug, Clone)]
enum Encoding {
    Disabled,
    Base64,
    Custom {
        encoder: Transform,
        decoder: Transform,
        encoder_params: Vec<Value>,
        decoder_params: Vec<Value>,
    },
}

/// A validated [`EncodingOptions`].
#[derive(Debug, Clone)]
pub struct Encoder {
    encoding: Encoding,
}

fn params_list(
    params: Option<Value>,
    err: ConfigError,
) -> std::result::Result<Vec<Value>, ConfigError> {
    match params {
        None => Ok(Vec::new()),
        Some(Value::Array(list)) => Ok(list),
        Some(_) => Err(err),
    }
}

impl Encoder {
    /// Validates `options`, failing on a missing transform or a non-array parameter list.
    pub fn configure(
        options: impl Into<EncodingOptions>,
    ) -> std::result::Result<Self, ConfigError> {
        let encoding = match options.into() {
            EncodingOptions::Disabled => Encoding::Disabled,
            EncodingOptions::Base64 => Encoding::Base64,
            EncodingOptions::Custom(custom) => {
                let encoder = custom.encoder.ok_or(ConfigError::MissingEncoder)?;
                let decoder = custom.decoder.ok_or(ConfigError::MissingDecoder)?;
                let encoder_params =
                    params_list(custom.encoder_params, ConfigError::EncoderParamsNotSequence)?;
                let decoder_params =
                    params_list(custom.decoder_params, ConfigError::DecoderParamsNotSequence)?;
                Encoding::Custom {
                    encoder,
                    decoder,
                    encoder_params,
                    decoder_params,
                }
            }
        };

        Ok(Self { encoding })
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.encoding, Encoding::Disabled)
    }

    pub fn encode(&self, value: &str) -> Result<String> {
        match &self.encoding {
            Encoding::Disabled => Ok(value.to_owned()),
            Encoding::Base64 => Ok(STANDARD.encode(value.as_bytes())),
            Encoding::Custom {
                encoder,
                encoder_params,
                ..
            } => encoder
                .call(value, encoder_params)
                .map_err(|_| Error::Encode),
        }
    }

    pub fn decode(&self, value: &str) -> Result<String> {
        match &self.encoding {
            Encoding::Disabled => Ok(value.to_owned()),
            Encoding::Base64 => {
                let bytes = STANDARD.decode(value.as_bytes()).map_err(|_| Error::Decode)?;
                String::from_utf8(bytes).map_err(|_| Error::Decode)
            }
            Encoding::Custom {
                decoder,
                decoder_params,
                ..
            } => decoder
                .call(value, decoder_params)
                .map_err(|_| Error::Decode),
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            encoding: Encoding::Disabled,
        }
    }
}
