//! Error type shared by the whole crate.

/// Errors raised while building structured arguments or writing documents.
///
/// Construction-time precondition failures ([`Error::InvalidPattern`]) never reach
/// serialization. Every other variant is a sink failure and is surfaced to the caller
/// unchanged.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A format pattern could not be compiled.
    #[error("invalid format pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A value was written to a sink without a preceding field name.
    #[error("value written without a field name")]
    MissingFieldName,

    /// A field name was left without a value, either by writing another field name or by
    /// finishing the document.
    #[error("field {0:?} has no value")]
    DanglingFieldName(String),

    /// The underlying writer failed.
    #[error("failed to write document")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded, or a raw value was not valid JSON.
    #[error("failed to encode value")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_pattern(pattern: &str, reason: &'static str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_owned(),
            reason,
        }
    }
}
