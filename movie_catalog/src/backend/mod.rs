//! Remote backend contract.
//!
//! The hosted service owns accounts, sessions, documents and files. This
//! module describes the fixed request/response contract the rest of the crate
//! consumes, enabling testing through the in-memory implementation and
//! dependency injection of the REST client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::models::UploadAsset;

pub mod appwrite;
pub mod errors;
pub mod memory;
pub mod query;

pub use appwrite::AppwriteClient;
pub use errors::{BackendError, BackendResult};
pub use memory::{MemoryBackend, Operation};
pub use query::Query;

/// Auth account as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Opaque session handle returned by session creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub expire: Option<String>,
    #[serde(default)]
    pub current: bool,
}

/// A stored document: system attributes plus free-form fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "$updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Field value by attribute name
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.fields.get(attribute)
    }

    /// Decode the document into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}

/// Result page of a document listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    /// Number of matching documents before any limit
    #[serde(default)]
    pub total: u64,
    pub documents: Vec<Document>,
}

/// Metadata of an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId")]
    pub bucket_id: String,
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(rename = "sizeOriginal", default)]
    pub size_original: u64,
}

/// Remote backend operations
///
/// Every call either resolves or fails once; no implementation retries.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Create a new auth account
    async fn create_account(&self, email: &str, password: &str, name: &str)
    -> BackendResult<Account>;

    /// Create an email/password session; fails while another session is active
    async fn create_email_session(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Delete the active session
    async fn delete_current_session(&self) -> BackendResult<()>;

    /// Account behind the active session
    async fn get_account(&self) -> BackendResult<Account>;

    /// List documents matching all queries
    async fn list_documents(&self, collection: &str, queries: &[Query])
    -> BackendResult<DocumentList>;

    /// Create a document with a backend-generated id
    async fn create_document(&self, collection: &str, data: Value) -> BackendResult<Document>;

    /// Update the given fields of a document, preserving the others
    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document>;

    /// Delete a document
    async fn delete_document(&self, collection: &str, document_id: &str) -> BackendResult<()>;

    /// Upload a local file into a bucket
    async fn create_file(&self, bucket: &str, asset: &UploadAsset) -> BackendResult<StoredFile>;

    /// Public view URL of a stored file
    fn file_view_url(&self, bucket: &str, file_id: &str) -> String;
}
