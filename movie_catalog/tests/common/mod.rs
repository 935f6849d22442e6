//! Shared fixtures for the movie_catalog integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use movie_catalog::{
    BackendAccess, CollectionIds, MemoryBackend, MovieSummary, SessionManager,
    backend::{
        Account, BackendResult, Document, DocumentList, Query, RemoteBackend, Session, StoredFile,
    },
    models::UploadAsset,
};
use serde_json::Value;
use std::sync::Arc;

/// In-memory backend plus a session manager over it
pub fn setup() -> (Arc<MemoryBackend>, SessionManager) {
    let backend = Arc::new(MemoryBackend::with_endpoint("https://cloud.test/v1", "proj"));
    let access = BackendAccess::new(backend.clone(), CollectionIds::default());
    (backend, SessionManager::new(access))
}

/// Signed-up and signed-in session for `username`
pub async fn signed_in(username: &str) -> (Arc<MemoryBackend>, SessionManager) {
    let (backend, session) = setup();
    session
        .sign_up(&format!("{username}@example.com"), "password123", username)
        .await
        .expect("sign-up should succeed");
    (backend, session)
}

pub fn movie(id: i64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster{id}.jpg")),
    }
}

/// Backend that yields to the scheduler before every call
///
/// Lets two futures driven by `tokio::join!` interleave at the remote call,
/// as they would against a real network.
pub struct YieldingBackend(pub Arc<MemoryBackend>);

#[async_trait]
impl RemoteBackend for YieldingBackend {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> BackendResult<Account> {
        tokio::task::yield_now().await;
        self.0.create_account(email, password, name).await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> BackendResult<Session> {
        tokio::task::yield_now().await;
        self.0.create_email_session(email, password).await
    }

    async fn delete_current_session(&self) -> BackendResult<()> {
        tokio::task::yield_now().await;
        self.0.delete_current_session().await
    }

    async fn get_account(&self) -> BackendResult<Account> {
        tokio::task::yield_now().await;
        self.0.get_account().await
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        tokio::task::yield_now().await;
        self.0.list_documents(collection, queries).await
    }

    async fn create_document(&self, collection: &str, data: Value) -> BackendResult<Document> {
        tokio::task::yield_now().await;
        self.0.create_document(collection, data).await
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document> {
        tokio::task::yield_now().await;
        self.0.update_document(collection, document_id, data).await
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> BackendResult<()> {
        tokio::task::yield_now().await;
        self.0.delete_document(collection, document_id).await
    }

    async fn create_file(&self, bucket: &str, asset: &UploadAsset) -> BackendResult<StoredFile> {
        tokio::task::yield_now().await;
        self.0.create_file(bucket, asset).await
    }

    fn file_view_url(&self, bucket: &str, file_id: &str) -> String {
        self.0.file_view_url(bucket, file_id)
    }
}

/// Yielding backend plus a session manager over it
pub fn setup_yielding() -> (Arc<MemoryBackend>, SessionManager) {
    let memory = Arc::new(MemoryBackend::new());
    let backend = Arc::new(YieldingBackend(memory.clone()));
    let access = BackendAccess::new(backend, CollectionIds::default());
    (memory, SessionManager::new(access))
}
