//! Error types for queue service operations.

use thiserror::Error;

/// Comprehensive error type for all queue service operations
#[derive(Debug, Error)]
pub enum SqsError {
    /// The request never produced an HTTP response (connection, DNS, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-200 status.
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to decode {action} response: {message}")]
    Decode { action: String, message: String },

    #[error("Queue not found: {name}")]
    QueueNotFound { name: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl SqsError {
    /// HTTP status code carried by the error, if the service produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Service(e) => Some(e.status_code),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check whether the error reports a missing queue
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::QueueNotFound { .. } => true,
            Self::Service(e) => matches!(
                e.code.as_str(),
                "AWS.SimpleQueueService.NonExistentQueue" | "QueueDoesNotExist"
            ),
            _ => false,
        }
    }

    pub(crate) fn decode(action: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            action: action.to_string(),
            message: message.into(),
        }
    }
}

/// Error reported by the queue service for a non-200 response.
///
/// The HTTP status fields are always populated. The remaining fields come
/// from the XML error document and stay empty when the body could not be
/// parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    /// HTTP status code (403, 500, ...)
    pub status_code: u16,
    /// HTTP status text ("Forbidden", "Service Unavailable", ...)
    pub status_text: String,
    /// Whether the fault lies with the sender or the receiver
    pub error_type: String,
    /// Service error code ("InvalidParameterValue", ...)
    pub code: String,
    /// Human-oriented message
    pub message: String,
    /// Unique id of the failed request
    pub request_id: String,
}

impl ServiceError {
    /// Create an error carrying only the HTTP status
    pub fn from_status(status_code: u16, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            ..Default::default()
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Unknown region: {name}")]
    UnknownRegion { name: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
