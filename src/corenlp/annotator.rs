//! Trait implemented by annotation backends.

use async_trait::async_trait;

use crate::nlp::{AnnotationResponse, NlpError};

/// A backend that turns raw text into a sentence-level annotation.
///
/// `CoreNlpClient` talks to a CoreNLP server; tests plug in canned responses.
#[async_trait]
pub trait TextAnnotator: Send + Sync {
    /// Human-readable name for CLI output.
    fn display_name(&self) -> &str;

    /// Whether the backend is ready to accept requests.
    async fn is_available(&self) -> bool {
        true
    }

    /// Annotate one text.
    ///
    /// A service-side failure is returned as `Ok(AnnotationResponse::Failure)`;
    /// `Err` is reserved for transport problems and malformed structure.
    async fn annotate(&self, text: &str) -> Result<AnnotationResponse, NlpError>;
}
