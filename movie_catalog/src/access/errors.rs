//! Access-layer error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Message shown when a required form field is empty
pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";

/// Errors surfaced to screens
///
/// Every variant renders to the plain message a screen shows in its notice.
#[derive(Debug, Error)]
pub enum AccessError {
    /// A required input was empty or malformed; no remote call was made
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the call or could not be reached
    #[error("{0}")]
    Remote(#[from] BackendError),

    /// A session exists but its profile could not be fetched
    #[error("Signed in but failed to fetch the user profile. Check collection permissions.")]
    ProfileMissing,

    /// The account was created but the follow-up sign-in failed
    #[error("Account {account_id} was created but signing in failed: {source}")]
    SignUpIncomplete {
        account_id: String,
        #[source]
        source: Box<AccessError>,
    },

    /// A document did not have the expected shape
    #[error("Malformed {entity} document: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The operation needs an authenticated user
    #[error("You need to sign in first")]
    NotSignedIn,

    /// The same screen already has this operation in flight
    #[error("Another update is still in progress")]
    Busy,
}

impl AccessError {
    pub fn validation(message: impl Into<String>) -> Self {
        AccessError::Validation(message.into())
    }

    /// Whether the failure happened before any remote call
    pub fn is_validation(&self) -> bool {
        matches!(self, AccessError::Validation(_))
    }

    /// Whether the backend reported a missing or invalid session
    pub fn is_unauthorized(&self) -> bool {
        match self {
            AccessError::Remote(e) => e.is_unauthorized(),
            AccessError::ProfileMissing | AccessError::NotSignedIn => true,
            _ => false,
        }
    }

    /// Message for the acknowledgment notice
    pub fn client_message(&self) -> String {
        match self {
            // The id is only useful in logs
            AccessError::SignUpIncomplete { source, .. } => source.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for access-layer operations
pub type AccessResult<T> = Result<T, AccessError>;
