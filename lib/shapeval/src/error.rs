//! Error types for shape validation.

/// An error preventing the validation of a value.
///
/// Values not conforming to a shape are not errors: they are reported as
/// [`Violation`](crate::Violation)s.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A guard has not been redacted before validation.
    #[error("Unexpected guard on axis '{axis}': shapes must be redacted before validation")]
    Guard { axis: String },

    /// Invalid regex pattern.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl ValidationError {
    /// Creates an unexpected guard error.
    pub fn guard(axis: impl Into<String>) -> Self {
        Self::Guard { axis: axis.into() }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
