//! Error types shared by the harvesting pipeline.

use thiserror::Error;

/// Failure while requesting one page from the search API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused/reset or a timeout. Worth retrying.
    #[error("transient network failure: {0}")]
    Transient(String),
    #[error("search API returned HTTP {0}")]
    Status(u16),
    #[error("could not decode search response: {0}")]
    Decode(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }

    /// Short label used in log lines (`Transient`, `Status`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transient(_) => "Transient",
            FetchError::Status(_) => "Status",
            FetchError::Decode(_) => "Decode",
            FetchError::Request(_) => "Request",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            FetchError::Transient(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Failure while persisting a record. These are never swallowed.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write to output failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
