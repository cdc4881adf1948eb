//! Error types for the dataset subsystem.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching or interpreting dataset files.
#[derive(Error, Debug)]
pub enum DataError {
    /// The host answered with a non-success status
    #[error("HTTP {status} fetching {path}{}", body_suffix(.body))]
    Fetch {
        /// Dataset path that was requested
        path: String,
        /// HTTP status code
        status: u16,
        /// Start of the response body, if any
        body: String,
    },

    /// The request never produced a response
    #[error("network error fetching {path}: {source}")]
    Network {
        /// Dataset path that was requested
        path: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The file does not exist
    #[error("resource not found: {path}")]
    NotFound {
        /// Dataset path that was requested
        path: String,
    },

    /// The body is not valid JSON
    #[error("failed to parse JSON from {path}: {source}")]
    Parse {
        /// Dataset path that was requested
        path: String,
        /// JSON parse error
        #[source]
        source: serde_json::Error,
    },

    /// The index payload is neither an array nor an object wrapping one
    #[error("unexpected index payload shape: {0}")]
    Shape(String),

    /// No response within the configured timeout
    #[error("timed out after {after:?} fetching {path}")]
    Timeout {
        /// Dataset path that was requested
        path: String,
        /// Configured timeout
        after: Duration,
    },

    /// I/O error reading a local mirror
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Dataset path that was requested
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Base URL cannot be combined with a dataset path
    #[error("invalid dataset URL: {0}")]
    InvalidUrl(String),
}

impl DataError {
    /// Whether this error means the resource is simply absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error came from the fetch timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("\n{body}")
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = DataError::Fetch {
            path: "data/index_regulados.json".to_string(),
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 500 fetching data/index_regulados.json");

        let err = DataError::Fetch {
            path: "data/index_regulados.json".to_string(),
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 503 fetching data/index_regulados.json\nmaintenance"
        );
    }

    #[test]
    fn test_classifiers() {
        let err = DataError::NotFound {
            path: "data/his/45/12345.json".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_timeout());

        let err = DataError::Timeout {
            path: "data/reg/00/00007.json".to_string(),
            after: Duration::from_secs(15),
        };
        assert!(err.is_timeout());
        assert!(!err.is_not_found());
    }
}
