//! Typed errors for the research pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the binary is the only
//! place that flattens them into `anyhow::Error`.

use thiserror::Error;

use crate::research_log::DebugLogEntry;

/// Errors from a single outbound page retrieval attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection reset, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a status >= 400
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Request exceeded its timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// URL could not be parsed or has an unsupported scheme
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            return FetchError::Timeout { url };
        }
        if let Some(status) = err.status() {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            return FetchError::Status {
                url,
                status: status.as_u16(),
            };
        }
        FetchError::Http(Box::new(err))
    }
}

/// Errors that can end a research request or a single resolution stage.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// The organization's own home page could not be fetched. Nothing
    /// downstream can run without it.
    #[error("failed to fetch the provided URL {url}: {details}")]
    InitialFetch { url: String, details: String },

    /// Input URL is malformed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Fetch failed inside a stage
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// URL parsing failed inside a stage
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Unclassified fault
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResearchError {
    /// HTTP status an outer shell should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ResearchError::InitialFetch { .. } => 502,
            ResearchError::InvalidUrl(_) => 400,
            _ => 500,
        }
    }
}

/// A failed research request together with the log gathered before it failed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ResearchFailure {
    #[source]
    pub error: ResearchError,
    pub debug_log: Vec<DebugLogEntry>,
}

impl ResearchFailure {
    pub fn new(error: ResearchError, debug_log: Vec<DebugLogEntry>) -> Self {
        Self { error, debug_log }
    }

    pub fn status_code(&self) -> u16 {
        self.error.status_code()
    }

    /// JSON body an outer shell returns for this failure.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.error {
            ResearchError::InitialFetch { url, details } => serde_json::json!({
                "error": "Failed to fetch the provided URL",
                "details": details,
                "url": url,
                "debug_log": self.debug_log,
            }),
            ResearchError::InvalidUrl(message) => serde_json::json!({
                "error": "Invalid URL format",
                "details": message,
            }),
            other => serde_json::json!({
                "error": "Internal server error",
                "message": other.to_string(),
                "debug_log": self.debug_log,
            }),
        }
    }
}

/// Result type alias for research operations.
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Result type alias for fetch attempts.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let initial = ResearchError::InitialFetch {
            url: "https://example.org".to_string(),
            details: "HTTP 503".to_string(),
        };
        assert_eq!(initial.status_code(), 502);
        assert_eq!(ResearchError::InvalidUrl("x".into()).status_code(), 400);
        assert_eq!(ResearchError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "https://example.org/missing".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 for https://example.org/missing");
    }

    #[test]
    fn test_failure_body_carries_details() {
        let failure = ResearchFailure::new(
            ResearchError::InitialFetch {
                url: "https://down.example".to_string(),
                details: "HTTP 503 for https://down.example".to_string(),
            },
            vec![],
        );
        let body = failure.to_json();
        assert_eq!(failure.status_code(), 502);
        assert_eq!(body["error"], "Failed to fetch the provided URL");
        assert_eq!(body["url"], "https://down.example");
    }
}
