//! Error types for jobs messages

use thiserror::Error;

use crate::repeated::FieldType;

/// Result type alias for message operations
pub type Result<T> = std::result::Result<T, JobsError>;

/// Errors that can occur when building, mutating or (de)serializing a message
#[derive(Debug, Error)]
pub enum JobsError {
    /// A value assigned to a field does not have the field's type
    #[error("Type validation failed for field `{field}` (expected {expected}): {reason}")]
    TypeValidation {
        /// Field the value was assigned to
        field: String,
        /// Element type the field requires
        expected: FieldType,
        /// What was wrong with the value
        reason: String,
    },

    /// Init data named a field the message does not have
    #[error("Message `{message}` has no field named `{field}`")]
    UnknownField {
        /// Fully-qualified message name
        message: String,
        /// The unrecognized key
        field: String,
    },

    /// Message name is not present in the schema registry
    #[error("Unknown message type: {0}")]
    UnknownMessage(String),

    /// Binary payload could not be decoded
    #[error("Failed to decode message: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Binary payload could not be encoded
    #[error("Failed to encode message: {0}")]
    Encode(#[from] prost::EncodeError),

    /// JSON payload could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JobsError {
    /// Create a type validation error
    pub fn type_validation(
        field: impl Into<String>,
        expected: FieldType,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeValidation {
            field: field.into(),
            expected,
            reason: reason.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            message: message.into(),
            field: field.into(),
        }
    }

    /// Check if this error is a type validation error
    pub fn is_type_validation(&self) -> bool {
        matches!(self, Self::TypeValidation { .. })
    }

    /// Check if this error came from one of the wire or JSON codecs
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_) | Self::Json(_))
    }
}
