use thiserror::Error;

/// Errors surfaced by a [`crate::Backend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure talking to the service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("request failed: {status} - {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Base URL could not be parsed or joined
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected before it reached the service
    #[error("Request failed: {0}")]
    Request(String),

    /// Procedure or function is not known to the backend
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;
