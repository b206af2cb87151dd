//! Stanford CoreNLP client.
//!
//! Sends raw text to a CoreNLP server and decodes the JSON annotation. The
//! server reports errors as plain text, which is surfaced as
//! `AnnotationResponse::Failure` rather than an `Err`.

mod annotator;
mod config;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

pub use annotator::TextAnnotator;
pub use config::CoreNlpConfig;

use crate::nlp::{AnnotationResponse, NlpError};

/// Client for a CoreNLP server.
pub struct CoreNlpClient {
    config: CoreNlpConfig,
    client: Client,
}

impl CoreNlpClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CoreNlpConfig) -> Result<Self, NlpError> {
        config.validate().map_err(NlpError::Api)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| NlpError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CoreNlpConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TextAnnotator for CoreNlpClient {
    fn display_name(&self) -> &str {
        "Stanford CoreNLP"
    }

    async fn is_available(&self) -> bool {
        match self.client.get(self.url("ready")).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("CoreNLP readiness probe failed: {}", e);
                false
            }
        }
    }

    async fn annotate(&self, text: &str) -> Result<AnnotationResponse, NlpError> {
        debug!("Annotating {} chars via {}", text.len(), self.config.endpoint);

        let resp = self
            .client
            .post(self.url(""))
            .query(&[("properties", self.config.properties())])
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| NlpError::Connection(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| NlpError::Connection(e.to_string()))?;

        if !status.is_success() {
            warn!("CoreNLP returned HTTP {}", status);
        }

        parse_response_body(&body)
    }
}

/// Decode a CoreNLP response body.
///
/// Anything that is not JSON is the server's error text.
pub fn parse_response_body(body: &str) -> Result<AnnotationResponse, NlpError> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => AnnotationResponse::from_value(value),
        Err(_) => Ok(AnnotationResponse::Failure(body.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_body_is_failure() {
        let response =
            parse_response_body("CoreNLP request timed out. Your document may be too long.\n")
                .unwrap();
        assert_eq!(
            response,
            AnnotationResponse::Failure(
                "CoreNLP request timed out. Your document may be too long.".to_string()
            )
        );
    }

    #[test]
    fn test_json_body_is_structured() {
        let response = parse_response_body(r#"{"sentences": []}"#).unwrap();
        assert!(matches!(response, AnnotationResponse::Structured(ref r) if r.sentences.is_empty()));
    }

    #[test]
    fn test_json_body_missing_fields_is_malformed() {
        let err = parse_response_body(r#"{"docId": "x"}"#).unwrap_err();
        assert!(matches!(err, NlpError::MalformedAnnotation(_)));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client =
            CoreNlpClient::new(CoreNlpConfig::default().with_endpoint("http://nlp:9000/")).unwrap();
        assert_eq!(client.url("ready"), "http://nlp:9000/ready");
        assert_eq!(client.url(""), "http://nlp:9000/");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = CoreNlpClient::new(CoreNlpConfig::default().with_endpoint("nope"));
        assert!(result.is_err());
    }
}
