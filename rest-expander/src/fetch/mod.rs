//! Fetching referenced resources
//!
//! The engine never talks to the network itself; it goes through an
//! injected [`Transport`]. [`Fetcher`] layers the response cache and body
//! validation on top of it.

mod fetcher;
mod http;
mod memory;

pub use fetcher::{Fetcher, FetcherStats};
pub use http::HttpTransport;
pub use memory::MemoryTransport;

use async_trait::async_trait;
use url::Url;

/// Why a reference could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Not an absolute URI
    InvalidUri(String),
    /// Connection or protocol failure
    Transport(String),
    /// No response within the configured timeout
    Timeout,
    /// Non-2xx response
    Status(u16),
    /// Body is not a JSON object
    Decode(String),
    /// Body carries the configured error marker
    ErrorBody(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidUri(msg) => write!(f, "invalid URI: {}", msg),
            FetchError::Transport(msg) => write!(f, "transport error: {}", msg),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {}", code),
            FetchError::Decode(msg) => write!(f, "unparsable body: {}", msg),
            FetchError::ErrorBody(marker) => write!(f, "body carries error marker '{}'", marker),
        }
    }
}

impl std::error::Error for FetchError {}

/// A single bounded GET. No retries: one failure is one failed reference.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, uri: &Url) -> Result<String, FetchError>;
}

/// Validate an absolute request URI
pub fn parse_uri(uri: &str) -> Result<Url, FetchError> {
    Url::parse(uri).map_err(|e| FetchError::InvalidUri(format!("{}: {}", uri, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uri() {
        assert!(parse_uri("http://valid").is_ok());
        assert!(parse_uri("http://localhost:9001/groups/id/7").is_ok());
        assert!(matches!(parse_uri("non-URI"), Err(FetchError::InvalidUri(_))));
        assert!(matches!(parse_uri("/relative/path"), Err(FetchError::InvalidUri(_))));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(FetchError::Status(404).to_string(), "unexpected HTTP status 404");
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
    }
}
