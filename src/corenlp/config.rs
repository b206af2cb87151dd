//! CoreNLP client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the CoreNLP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreNlpConfig {
    /// Server endpoint (default: http://localhost:9000)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Annotator pipeline requested from the server
    #[serde(default = "default_annotators")]
    pub annotators: String,
    /// Server-side annotation timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Client-side HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:9000".to_string()
}

fn default_annotators() -> String {
    "ssplit,ner,depparse".to_string()
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for CoreNlpConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl CoreNlpConfig {
    /// Base default without env overrides.
    fn base_default() -> Self {
        Self {
            endpoint: default_endpoint(),
            annotators: default_annotators(),
            timeout_ms: default_timeout_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::base_default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `CORENLP_URL`: server endpoint
    /// - `CORENLP_ANNOTATORS`: comma-separated annotator list
    /// - `CORENLP_TIMEOUT_MS`: server-side timeout
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = std::env::var("CORENLP_URL").ok().filter(|s| !s.is_empty()) {
            self.endpoint = url;
        }
        if let Some(annotators) = std::env::var("CORENLP_ANNOTATORS")
            .ok()
            .filter(|s| !s.is_empty())
        {
            self.annotators = annotators;
        }
        if let Some(timeout) = std::env::var("CORENLP_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.timeout_ms = timeout;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Validate the endpoint URL.
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| format!("Invalid CoreNLP endpoint '{}': {}", self.endpoint, e))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(format!(
                "Unsupported scheme '{}' for CoreNLP endpoint '{}'",
                other, self.endpoint
            )),
        }
    }

    /// JSON value of the `properties` query parameter.
    pub fn properties(&self) -> String {
        serde_json::json!({
            "annotators": self.annotators,
            "outputFormat": "json",
            "timeout": self.timeout_ms,
        })
        .to_string()
    }
}
