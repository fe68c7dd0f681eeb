// Error taxonomy for the moderation pipeline.
//
// Validation errors are caller mistakes (HTTP 400). Extraction errors come
// from structured LLM calls and are either absorbed (suggestion stage) or
// surfaced as an internal failure (analysis stage). Feedback timeouts never
// appear here: the feedback race turns them into fallback text.

use thiserror::Error;

/// A structured LLM call produced nothing usable.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The provider call itself failed (transport, HTTP status, no tool call).
    #[error("provider call failed: {0}")]
    Provider(String),

    /// The provider answered, but the output is not an instance of the schema.
    #[error("malformed structured output: {0}")]
    Malformed(String),

    /// The provider did not answer within the extraction timeout.
    #[error("structured call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A required schema field was absent or null.
    #[error("structured output is missing field `{0}`")]
    MissingField(String),
}

/// Request-level failure returned by the orchestrator.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// A required field was missing or unrecognised.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A structured extraction failed in a stage with no fallback.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Anything else. The detail is logged, never shown to the caller.
    #[error("Internal server error")]
    Internal,
}

impl ModerationError {
    pub fn missing(field: &'static str) -> Self {
        let mut label = field.to_string();
        if let Some(first) = label.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        ModerationError::Validation {
            field,
            message: format!("{label} not found"),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ModerationError::Validation { .. } => 400,
            ModerationError::Extraction(_) | ModerationError::Internal => 500,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ModerationError::Validation { message, .. } => message.clone(),
            ModerationError::Extraction(_) | ModerationError::Internal => {
                "Internal server error".to_string()
            }
        }
    }
}
