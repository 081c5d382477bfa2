use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    #[error("{backend} API error {status}: {body}")]
    Http {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },
}

impl LlmError {
    pub fn timeout(operation: &str, timeout: Duration) -> Self {
        LlmError::Timeout {
            operation: operation.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Maps a transport error, keeping reqwest's own timeouts distinguishable.
    pub fn from_reqwest(error: reqwest::Error, operation: &str, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::timeout(operation, timeout)
        } else {
            LlmError::Network {
                message: error.to_string(),
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            LlmError::Http {
                backend,
                status,
                body,
            } => format!("{} returned HTTP {}: {}", backend, status, body),
            LlmError::Timeout {
                operation,
                timeout_ms,
            } => format!(
                "{} took longer than {:.1}s and was cancelled",
                operation,
                *timeout_ms as f64 / 1000.0
            ),
            other => other.to_string(),
        }
    }

    pub fn short_message(&self) -> String {
        match self {
            LlmError::Http { status, .. } => format!("HTTP {}", status),
            LlmError::Timeout { .. } => "timeout".to_string(),
            LlmError::Network { .. } => "network error".to_string(),
            LlmError::InvalidResponse { .. } => "invalid response".to_string(),
            LlmError::Authentication { .. } => "authentication error".to_string(),
        }
    }
}
