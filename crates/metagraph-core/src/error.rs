use derive_more::Display;
use thiserror::Error as ThisError;

///
/// MetadataError
///
/// Structured runtime error with a stable internal classification.
/// Every fatal condition in this crate propagates as one of these; callers
/// are expected to treat any of them as a transaction-abort signal. No
/// retry logic exists at this layer.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct MetadataError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl MetadataError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a registry-origin configuration error.
    pub(crate) fn registry_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Registry, message)
    }

    /// Construct a schema-origin configuration error.
    pub(crate) fn schema_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Schema, message)
    }

    /// Construct a codec-origin encoding error.
    pub(crate) fn codec_encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Encoding, ErrorOrigin::Codec, message)
    }

    /// Construct a codec-origin corruption error (stream is abandoned).
    pub(crate) fn codec_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Codec, message)
    }

    /// Construct an identity-origin error (caller ordering bug).
    pub(crate) fn identity(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Identity, ErrorOrigin::Identity, message)
    }

    /// Construct a delta-origin structural mismatch error.
    pub(crate) fn delta_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Encoding, ErrorOrigin::Delta, message)
    }

    /// Construct a delta-origin validation error (e.g. null child key).
    pub(crate) fn delta_key(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, ErrorOrigin::Delta, message)
    }

    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self.class, ErrorClass::Config)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorClass {
    /// Malformed or inconsistent metadata; never retried.
    #[display("config")]
    Config,
    /// A record or delta that cannot be encoded or decoded.
    #[display("encoding")]
    Encoding,
    /// Byte or text stream damaged mid-record.
    #[display("corruption")]
    Corruption,
    /// Identity minted, stripped, or resolved out of order.
    #[display("identity")]
    Identity,
    /// Batched all-or-nothing acceptance failures.
    #[display("validation")]
    Validation,
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorOrigin {
    #[display("schema")]
    Schema,
    #[display("registry")]
    Registry,
    #[display("identity")]
    Identity,
    #[display("codec")]
    Codec,
    #[display("delta")]
    Delta,
    #[display("walker")]
    Walker,
}
