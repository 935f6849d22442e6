//! Backend error types.

use thiserror::Error;

/// Errors reported by a remote backend call
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connection refused, DNS, TLS, ...)
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by the service itself
    #[error("{message}")]
    Api {
        code: u16,
        kind: String,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local file could not be read for upload
    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Build a service-reported error
    pub fn api(code: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Api {
            code,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Status code of a service-reported error
    pub fn code(&self) -> Option<u16> {
        match self {
            BackendError::Api { code, .. } => Some(*code),
            BackendError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the call failed because no valid session was present
    pub fn is_unauthorized(&self) -> bool {
        self.code() == Some(401)
    }

    /// Whether the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(404)
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
