//! Error types for annotation decoding and the annotation service.

use thiserror::Error;

/// Errors from annotation decoding, aggregation callers, and annotation backends.
#[derive(Debug, Error)]
pub enum NlpError {
    /// The service answered with an error string instead of structured sentences.
    #[error("Annotation service failed: {0}")]
    UpstreamFailure(String),

    /// A structurally "successful" response is missing required fields.
    #[error("Malformed annotation structure: {0}")]
    MalformedAnnotation(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NlpError {
    /// Whether the error only means "skip this text" rather than a real failure.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, NlpError::UpstreamFailure(_))
    }
}
