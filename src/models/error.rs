//! Error types for entn.
//!
//! Taxonomy:
//! - Transient: network hiccups worth retrying (timeout, connect, 5xx, 429)
//! - Terminal per-record: converted to a failure row, never fatal to the run
//! - Infrastructure: file/checkpoint I/O, propagates and ends the run

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for entn.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Service error (status {status})")]
    Http { status: u16 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    #[error("Id {0} not found in input table")]
    IdNotFound(u64),
}

impl ScrapeError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if this error is worth retrying.
    ///
    /// 4xx statuses other than 429 mean the request itself was rejected and
    /// will be rejected again; everything service- or network-shaped gets
    /// another chance.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http { status } => *status == 429 || *status >= 500,
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type alias for entn.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ScrapeError::Http { status: 500 }.is_transient());
        assert!(ScrapeError::Http { status: 503 }.is_transient());
        assert!(ScrapeError::Http { status: 429 }.is_transient());
        assert!(!ScrapeError::Http { status: 400 }.is_transient());
        assert!(!ScrapeError::Http { status: 404 }.is_transient());
        assert!(ScrapeError::Timeout(Duration::from_secs(30)).is_transient());
    }

    #[test]
    fn infrastructure_errors_are_not_transient() {
        let err = ScrapeError::io(
            "writing output",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(!err.is_transient());
        assert!(!ScrapeError::InvalidCheckpoint("nope".into()).is_transient());
    }
}
