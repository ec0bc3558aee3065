//! Error types for query compilation.

/// An error raised while compiling a query.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The query syntax is invalid.
    #[error("Malformed query: {message}")]
    Malformed { message: String },

    /// A path step is not part of the field envelope of the base shape.
    #[error("Unknown path step '{step}'")]
    UnknownPath { step: String },

    /// A well-formed value is out of its allowed range.
    #[error("Illegal query: {message}")]
    Illegal { message: String },

    /// The query is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub(crate) fn unknown_path(step: impl Into<String>) -> Self {
        Self::UnknownPath { step: step.into() }
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        Self::Illegal {
            message: message.into(),
        }
    }
}
