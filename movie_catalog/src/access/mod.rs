//! Backend access layer.
//!
//! Translates catalog operations (sign in, save a movie, bump a search
//! count, ...) into calls against a [`RemoteBackend`]. Documents are decoded
//! into typed records here, so nothing above this layer sees untyped data.
//!
//! Multi-step operations are not atomic: a failure between steps leaves the
//! earlier steps in place and no compensating call is made.

use std::sync::Arc;

use crate::{
    backend::{Document, RemoteBackend},
    config::CollectionIds,
};

pub mod auth;
pub mod errors;
pub mod movies;
pub mod profile;

pub use errors::{AccessError, AccessResult, FILL_ALL_FIELDS};

/// Outcome of an operation whose failure must not block the caller
///
/// `Recoverable` covers expected absence (no session, no profile row);
/// `Fatal` covers anything unexpected. Callers complete their state
/// transition in every case and only vary how loudly they log.
#[derive(Debug)]
pub enum BestEffort<T> {
    Ok(T),
    Recoverable(AccessError),
    Fatal(AccessError),
}

impl<T> BestEffort<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            BestEffort::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, BestEffort::Ok(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, BestEffort::Fatal(_))
    }

    /// Failure, if any
    pub fn error(&self) -> Option<&AccessError> {
        match self {
            BestEffort::Ok(_) => None,
            BestEffort::Recoverable(e) | BestEffort::Fatal(e) => Some(e),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BestEffort<U> {
        match self {
            BestEffort::Ok(value) => BestEffort::Ok(f(value)),
            BestEffort::Recoverable(e) => BestEffort::Recoverable(e),
            BestEffort::Fatal(e) => BestEffort::Fatal(e),
        }
    }

    /// Classify a failure: missing session or resource is recoverable
    pub(crate) fn from_error(error: AccessError) -> Self {
        let expected = match &error {
            AccessError::Remote(e) => e.is_unauthorized() || e.is_not_found(),
            AccessError::ProfileMissing | AccessError::NotSignedIn => true,
            _ => false,
        };
        if expected {
            BestEffort::Recoverable(error)
        } else {
            BestEffort::Fatal(error)
        }
    }
}

/// Catalog operations over a remote backend
#[derive(Clone)]
pub struct BackendAccess {
    backend: Arc<dyn RemoteBackend>,
    collections: CollectionIds,
}

impl BackendAccess {
    /// Create a new access layer
    ///
    /// # Arguments
    ///
    /// * `backend` - Remote backend implementation
    /// * `collections` - Collection and bucket ids to address
    pub fn new(backend: Arc<dyn RemoteBackend>, collections: CollectionIds) -> Self {
        Self {
            backend,
            collections,
        }
    }

    pub fn collections(&self) -> &CollectionIds {
        &self.collections
    }

    pub(crate) fn backend(&self) -> &dyn RemoteBackend {
        self.backend.as_ref()
    }
}

/// Decode a document, tagging failures with the entity name
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    entity: &'static str,
    document: &Document,
) -> AccessResult<T> {
    document
        .decode()
        .map_err(|source| AccessError::Decode { entity, source })
}
