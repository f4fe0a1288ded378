//! Error types for the telemetry API client.

use thiserror::Error;

/// Errors that can occur when talking to the telemetry API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The response had an unexpected shape.
    #[error("Invalid data format from {0}")]
    InvalidFormat(&'static str),

    /// No company configured, so dryer configs cannot be requested.
    #[error("No company (empresa) configured")]
    MissingCompany,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else if err.status().is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403) {
            ApiError::Auth(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            ApiError::InvalidFormat("/secador/online").to_string(),
            "Invalid data format from /secador/online"
        );
        assert_eq!(
            ApiError::Auth("bad token".to_string()).to_string(),
            "Authentication failed: bad token"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(ApiError::from(err), ApiError::Parse(_)));
    }
}
