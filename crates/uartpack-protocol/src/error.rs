//! Codec error types.

use thiserror::Error;

/// Errors that can occur when encoding requests or decoding responses.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A request key or value has a type outside the supported set.
    #[error("unsupported value type for encoding: {0}")]
    UnsupportedValueType(String),

    /// A timestamp does not have exactly six components.
    #[error("timestamp must have 6 components, got {actual}")]
    InvalidTimestampLength {
        /// Number of components supplied.
        actual: usize,
    },

    /// The wire payload contains a token the value tree cannot represent.
    #[error("unrecognized token kind: {0}")]
    UnrecognizedTokenKind(String),

    /// A message carries none of the four timestamp fields.
    #[error("message {mid} has no occurred, reset, root cause or end-of-list timestamp")]
    UnknownMessageKind {
        /// Message id of the offending entry.
        mid: i64,
    },

    /// None of the classifier tags could be located in the payload.
    #[error("response does not match any known response shape")]
    UnclassifiableResponse,

    /// A required field is absent from a decoded map.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong shape.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Wire token of the field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The MessagePack reader rejected the payload.
    #[error("malformed payload: {0}")]
    Decode(#[from] rmpv::decode::Error),

    /// The MessagePack writer failed.
    #[error("failed to write payload: {0}")]
    Encode(#[from] rmp::encode::ValueWriteError<std::io::Error>),

    /// Low-level write failure for single-byte markers.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A decoded tree could not be projected onto a caller-supplied type.
    #[error("failed to deserialize custom type: {0}")]
    Deserialize(String),

    /// A hex dump could not be parsed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl CodecError {
    /// Build a [`CodecError::InvalidField`] error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
