use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Status and body of a backend reply, before any shape checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one serialized criteria document to the issue search endpoint.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn post_criteria(&self, criteria_json: String) -> Result<RawResponse, TransportError>;
}
