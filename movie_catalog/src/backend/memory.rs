//! In-memory backend.
//!
//! Behaves like a single-client view of the hosted service: one active
//! session at a time, documents per collection, files per bucket. Every call
//! is counted, and failures can be injected per [`Operation`] so tests can
//! reproduce network drops between steps of a multi-call flow.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{
    Account, Document, DocumentList, Query, RemoteBackend, Session, StoredFile,
    errors::{BackendError, BackendResult},
};
use crate::models::UploadAsset;

/// Backend operations that can be counted and failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAccount,
    CreateSession,
    DeleteSession,
    GetAccount,
    ListDocuments,
    CreateDocument,
    UpdateDocument,
    DeleteDocument,
    CreateFile,
}

struct StoredAccount {
    account: Account,
    password: String,
}

#[derive(Default)]
struct MemoryState {
    accounts: Vec<StoredAccount>,
    session: Option<Session>,
    collections: HashMap<String, Vec<Document>>,
    files: HashMap<String, Vec<StoredFile>>,
    calls: HashMap<Operation, usize>,
    fail_once: HashSet<Operation>,
    fail_always: HashSet<Operation>,
}

impl MemoryState {
    fn enter(&mut self, op: Operation) -> BackendResult<()> {
        *self.calls.entry(op).or_default() += 1;

        if self.fail_always.contains(&op) || self.fail_once.remove(&op) {
            return Err(BackendError::api(
                503,
                "network_failure",
                format!("Network request failed during {:?}", op),
            ));
        }
        Ok(())
    }

    fn documents_mut(&mut self, collection: &str) -> &mut Vec<Document> {
        self.collections.entry(collection.to_string()).or_default()
    }
}

/// In-memory implementation of [`RemoteBackend`]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    endpoint: String,
    project_id: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_endpoint("https://memory.local/v1", "local")
    }

    /// Backend whose file view URLs point at the given endpoint and project
    pub fn with_endpoint(endpoint: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            endpoint: endpoint.into(),
            project_id: project_id.into(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next call of `op`
    pub fn fail_next(&self, op: Operation) {
        self.lock().fail_once.insert(op);
    }

    /// Fail every call of `op` until [`MemoryBackend::recover`]
    pub fn fail_always(&self, op: Operation) {
        self.lock().fail_always.insert(op);
    }

    /// Stop injecting failures for `op`
    pub fn recover(&self, op: Operation) {
        let mut state = self.lock();
        state.fail_always.remove(&op);
        state.fail_once.remove(&op);
    }

    /// Number of calls made for `op`, failed ones included
    pub fn calls(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Number of calls made for any operation
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Whether a session is active
    pub fn has_active_session(&self) -> bool {
        self.lock().session.is_some()
    }

    /// Drop the active session, as an expiry would
    pub fn expire_session(&self) {
        self.lock().session = None;
    }

    /// Whether an account exists for the email
    pub fn has_account(&self, email: &str) -> bool {
        self.lock().accounts.iter().any(|a| a.account.email == email)
    }

    /// Snapshot of a collection
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of a bucket
    pub fn files(&self, bucket: &str) -> Vec<StoredFile> {
        self.lock().files.get(bucket).cloned().unwrap_or_default()
    }

    /// Insert a document directly, bypassing counters and faults
    pub fn seed_document(&self, collection: &str, data: Value) -> Document {
        let document = new_document(data);
        self.lock().documents_mut(collection).push(document.clone());
        document
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn new_document(data: Value) -> Document {
    let now = Utc::now().to_rfc3339();
    let fields = match data {
        Value::Object(map) => map,
        _ => Default::default(),
    };
    Document {
        id: new_id(),
        created_at: Some(now.clone()),
        updated_at: Some(now),
        fields,
    }
}

fn matches_query(document: &Document, query: &Query) -> bool {
    match query {
        Query::Equal { attribute, values } => document
            .get(attribute)
            .is_some_and(|v| values.iter().any(|expected| expected == v)),
        _ => true,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn apply_queries(documents: &[Document], queries: &[Query]) -> DocumentList {
    let mut matched: Vec<Document> = documents
        .iter()
        .filter(|d| queries.iter().all(|q| matches_query(d, q)))
        .cloned()
        .collect();
    let total = matched.len() as u64;

    for query in queries {
        match query {
            Query::OrderAsc(attribute) => {
                matched.sort_by(|a, b| compare_values(a.get(attribute), b.get(attribute)))
            }
            Query::OrderDesc(attribute) => {
                matched.sort_by(|a, b| compare_values(b.get(attribute), a.get(attribute)))
            }
            _ => {}
        }
    }

    if let Some(limit) = queries.iter().find_map(|q| match q {
        Query::Limit(limit) => Some(*limit as usize),
        _ => None,
    }) {
        matched.truncate(limit);
    }

    DocumentList {
        total,
        documents: matched,
    }
}

fn unauthorized() -> BackendError {
    BackendError::api(
        401,
        "general_unauthorized_scope",
        "User (role: guests) missing scope (account)",
    )
}

fn document_not_found() -> BackendError {
    BackendError::api(
        404,
        "document_not_found",
        "Document with the requested ID could not be found.",
    )
}

#[async_trait]
impl RemoteBackend for MemoryBackend {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> BackendResult<Account> {
        let mut state = self.lock();
        state.enter(Operation::CreateAccount)?;

        if state.accounts.iter().any(|a| a.account.email == email) {
            return Err(BackendError::api(
                409,
                "user_already_exists",
                "A user with the same id, email, or phone already exists in this project.",
            ));
        }

        let account = Account {
            id: new_id(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Some(Utc::now().to_rfc3339()),
        };
        state.accounts.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
        });
        Ok(account)
    }

    async fn create_email_session(&self, email: &str, password: &str) -> BackendResult<Session> {
        let mut state = self.lock();
        state.enter(Operation::CreateSession)?;

        if state.session.is_some() {
            return Err(BackendError::api(
                401,
                "user_session_already_exists",
                "Creation of a session is prohibited when a session is active.",
            ));
        }

        let account_id = state
            .accounts
            .iter()
            .find(|a| a.account.email == email && a.password == password)
            .map(|a| a.account.id.clone())
            .ok_or_else(|| {
                BackendError::api(
                    401,
                    "user_invalid_credentials",
                    "Invalid credentials. Please check the email and password.",
                )
            })?;

        let session = Session {
            id: new_id(),
            user_id: account_id,
            expire: Some((Utc::now() + chrono::Duration::days(365)).to_rfc3339()),
            current: true,
        };
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn delete_current_session(&self) -> BackendResult<()> {
        let mut state = self.lock();
        state.enter(Operation::DeleteSession)?;

        match state.session.take() {
            Some(_) => Ok(()),
            None => Err(unauthorized()),
        }
    }

    async fn get_account(&self) -> BackendResult<Account> {
        let mut state = self.lock();
        state.enter(Operation::GetAccount)?;

        let session = state.session.as_ref().ok_or_else(unauthorized)?;
        state
            .accounts
            .iter()
            .find(|a| a.account.id == session.user_id)
            .map(|a| a.account.clone())
            .ok_or_else(unauthorized)
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        let mut state = self.lock();
        state.enter(Operation::ListDocuments)?;

        let documents = state
            .collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(apply_queries(documents, queries))
    }

    async fn create_document(&self, collection: &str, data: Value) -> BackendResult<Document> {
        let mut state = self.lock();
        state.enter(Operation::CreateDocument)?;

        if !data.is_object() {
            return Err(BackendError::api(
                400,
                "document_invalid_structure",
                "Invalid document structure: data must be an object",
            ));
        }

        let document = new_document(data);
        state.documents_mut(collection).push(document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document> {
        let mut state = self.lock();
        state.enter(Operation::UpdateDocument)?;

        let Value::Object(changes) = data else {
            return Err(BackendError::api(
                400,
                "document_invalid_structure",
                "Invalid document structure: data must be an object",
            ));
        };

        let document = state
            .documents_mut(collection)
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(document_not_found)?;

        document.fields.extend(changes);
        document.updated_at = Some(Utc::now().to_rfc3339());
        Ok(document.clone())
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> BackendResult<()> {
        let mut state = self.lock();
        state.enter(Operation::DeleteDocument)?;

        let documents = state.documents_mut(collection);
        let index = documents
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(document_not_found)?;
        documents.remove(index);
        Ok(())
    }

    async fn create_file(&self, bucket: &str, asset: &UploadAsset) -> BackendResult<StoredFile> {
        let mut state = self.lock();
        state.enter(Operation::CreateFile)?;

        if asset.uri.is_empty() {
            return Err(BackendError::InvalidRequest("File uri is empty".to_string()));
        }

        let file = StoredFile {
            id: new_id(),
            bucket_id: bucket.to_string(),
            name: asset.name.clone(),
            mime_type: asset.mime_type.clone(),
            size_original: asset.size,
        };
        state
            .files
            .entry(bucket.to_string())
            .or_default()
            .push(file.clone());
        Ok(file)
    }

    fn file_view_url(&self, bucket: &str, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint, bucket, file_id, self.project_id
        )
    }
}
