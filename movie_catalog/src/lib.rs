//! # Movie Catalog
//!
//! Client-side core of a movie catalog: account sign-up and sign-in, a
//! process-wide session state, saved movies, search analytics and profile
//! editing. All persistence, authentication and file storage live in a hosted
//! backend reached through the [`backend::RemoteBackend`] contract.
//!
//! ## Architecture
//!
//! Layers, leaves first:
//!
//! - [`backend`]: the remote service contract plus a REST client
//!   ([`backend::AppwriteClient`]) and an in-memory fake
//!   ([`backend::MemoryBackend`])
//! - [`access`]: domain operations (sign in, save movie, update search count,
//!   ...) translated into backend calls, with typed records at the boundary
//! - [`session`]: the session store and the authentication lifecycle
//! - [`screens`]: view-models for the sign-in, sign-up, profile, saved list
//!   and movie card flows
//!
//! ## Example
//!
//! ```
//! use movie_catalog::{BackendAccess, CollectionIds, MemoryBackend, SessionManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(MemoryBackend::new());
//!     let access = BackendAccess::new(backend, CollectionIds::default());
//!     let session = SessionManager::new(access);
//!
//!     session.bootstrap().await;
//!     assert!(!session.store().snapshot().is_logged());
//! }
//! ```

/// Backend connection configuration.
pub mod config;
pub use config::{CatalogConfig, CollectionIds, ConfigError};

/// Remote backend contract and implementations.
pub mod backend;
pub use backend::{AppwriteClient, BackendError, MemoryBackend, Operation, RemoteBackend};

/// Typed records exchanged with the backend.
pub mod models;
pub use models::{FileAsset, Movie, MovieSummary, SavedMovie, SearchCount, UserProfile};

/// Domain operations over the backend.
pub mod access;
pub use access::{AccessError, AccessResult, BackendAccess, BestEffort};

/// Session state container and authentication lifecycle.
pub mod session;
pub use session::{SessionManager, SessionPhase, SessionSnapshot, SessionStore};

/// Screen view-models.
pub mod screens;
