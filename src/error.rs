//! Error types for the UserVoice client.
//!
//! This module defines `UserVoiceError`, the unified error type used
//! throughout the crate. Errors reported by the API itself arrive in an
//! `errors` envelope and are classified by [`UserVoiceError::from_api`].
//!
//! # Security
//!
//! Consumer and token secrets must never appear in logs or error messages.
//! Use `sanitize_message()` when building messages from external sources.

use std::time::Duration;
use thiserror::Error;

/// `errors.type` values the API uses to classify failures.
pub mod kinds {
    /// Authentication or permission failure.
    pub const UNAUTHORIZED: &str = "unauthorized";
    /// The requested record does not exist.
    pub const RECORD_NOT_FOUND: &str = "record_not_found";
    /// Server-side application fault.
    pub const APPLICATION_ERROR: &str = "application_error";
}

/// Unified error type for all UserVoice operations.
#[derive(Error, Debug)]
pub enum UserVoiceError {
    /// The API rejected the credentials, or a login flow could not obtain a token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The record does not exist, or the resource is not a collection.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API reported an internal application error.
    #[error("application error: {0}")]
    ApplicationError(String),

    /// The API reported an error of an unrecognized type.
    #[error("API error: {0}")]
    Api(String),

    /// A collection index was outside `0..size`.
    #[error("index {index} out of range for collection of size {size}")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The collection size at the time of the request.
        size: usize,
    },

    /// Configuration error - missing or invalid settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// OAuth handshake failed (malformed token reply and the like).
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Non-success HTTP status with a body that is not a JSON envelope.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The (truncated) response body.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} - the server may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T, E = UserVoiceError> = std::result::Result<T, E>;

impl UserVoiceError {
    /// Classifies an API `errors` envelope by its `type` field.
    pub fn from_api(kind: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            kinds::UNAUTHORIZED => UserVoiceError::Unauthorized(message),
            kinds::RECORD_NOT_FOUND => UserVoiceError::NotFound(message),
            kinds::APPLICATION_ERROR => UserVoiceError::ApplicationError(message),
            _ => UserVoiceError::Api(message),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        UserVoiceError::Unauthorized(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        UserVoiceError::NotFound(message.into())
    }

    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        UserVoiceError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        UserVoiceError::Config(message.into())
    }

    /// Creates an OAuth handshake error.
    pub fn oauth(message: impl Into<String>) -> Self {
        UserVoiceError::OAuth(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        UserVoiceError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Returns the server-supplied message for API-classified errors.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            UserVoiceError::Unauthorized(m)
            | UserVoiceError::NotFound(m)
            | UserVoiceError::ApplicationError(m)
            | UserVoiceError::Api(m) => Some(m),
            _ => None,
        }
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_unauthorized() {
        let err = UserVoiceError::from_api("unauthorized", "m");
        assert!(matches!(err, UserVoiceError::Unauthorized(ref m) if m == "m"));
    }

    #[test]
    fn test_from_api_record_not_found() {
        let err = UserVoiceError::from_api("record_not_found", "m");
        assert!(matches!(err, UserVoiceError::NotFound(ref m) if m == "m"));
    }

    #[test]
    fn test_from_api_application_error() {
        let err = UserVoiceError::from_api("application_error", "m");
        assert!(matches!(err, UserVoiceError::ApplicationError(ref m) if m == "m"));
    }

    #[test]
    fn test_from_api_unknown_type_is_generic() {
        let err = UserVoiceError::from_api("rate_limited", "slow down");
        assert!(matches!(err, UserVoiceError::Api(ref m) if m == "slow down"));
        assert_eq!(err.to_string(), "API error: slow down");
    }

    #[test]
    fn test_api_message() {
        assert_eq!(UserVoiceError::not_found("gone").api_message(), Some("gone"));
        let err = UserVoiceError::OutOfRange { index: 3, size: 2 };
        assert_eq!(err.api_message(), None);
    }

    #[test]
    fn test_out_of_range_display() {
        let err = UserVoiceError::OutOfRange { index: 10, size: 4 };
        assert_eq!(
            err.to_string(),
            "index 10 out of range for collection of size 4"
        );
    }

    #[test]
    fn test_missing_env_error() {
        let err = UserVoiceError::missing_env("UV_API_KEY");
        assert!(err.to_string().contains("UV_API_KEY"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_timeout_error() {
        let err = UserVoiceError::timeout(Duration::from_secs(30), "GET /api/v1/tickets");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("30s"));
    }

    #[test]
    fn test_sanitize_message_removes_secret() {
        let secret = "token_secret_12345";
        let message = format!("signing with {} failed", secret);
        let sanitized = UserVoiceError::sanitize_message(&message, secret);
        assert!(!sanitized.contains(secret));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        assert_eq!(UserVoiceError::sanitize_message(message, ""), message);
    }
}
