//! REST client for the hosted backend.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, multipart};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::sync::{PoisonError, RwLock};

use super::{
    Account, Document, DocumentList, Query, RemoteBackend, Session, StoredFile,
    errors::{BackendError, BackendResult},
};
use crate::{config::CatalogConfig, models::UploadAsset};

/// Placeholder asking the backend to generate an id
const UNIQUE_ID: &str = "unique()";
/// Response format the decoders below are written against
const RESPONSE_FORMAT: &str = "1.6.0";
/// Header carrying the session cookie for non-browser clients
const FALLBACK_COOKIES: &str = "X-Fallback-Cookies";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: u16,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Serialize)]
struct CreateAccountRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// API client for communicating with the hosted backend
pub struct AppwriteClient {
    endpoint: String,
    project_id: String,
    database_id: String,
    origin: String,
    client: reqwest::Client,
    session_cookie: RwLock<Option<String>>,
}

impl AppwriteClient {
    /// Create a new API client
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_http_client(config: &CatalogConfig, client: reqwest::Client) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            origin: format!("appwrite-android://{}", config.platform),
            client,
            session_cookie: RwLock::new(None),
        }
    }

    /// Whether a session cookie is currently held
    pub fn has_session(&self) -> bool {
        self.session_cookie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.endpoint, path))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Response-Format", RESPONSE_FORMAT)
            .header("X-SDK-Platform", "client")
            .header("Origin", &self.origin);

        let cookie = self
            .session_cookie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(cookie) = cookie {
            builder = builder.header(FALLBACK_COOKIES, cookie);
        }

        builder
    }

    fn set_session_cookie(&self, cookie: Option<String>) {
        *self
            .session_cookie
            .write()
            .unwrap_or_else(PoisonError::into_inner) = cookie;
    }

    async fn send(&self, builder: RequestBuilder) -> BackendResult<Response> {
        let response = builder.send().await?;

        if let Some(cookie) = response
            .headers()
            .get(FALLBACK_COOKIES)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            self.set_session_cookie(Some(cookie.to_string()));
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error response: {}", e));

        Err(match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => BackendError::Api {
                code: if body.code == 0 { status.as_u16() } else { body.code },
                kind: body.kind,
                message: body.message,
            },
            Err(_) => BackendError::api(
                status.as_u16(),
                "unknown",
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("Request failed").to_string()
                } else {
                    text
                },
            ),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> BackendResult<T> {
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn documents_path(&self, collection: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.database_id, collection
        )
    }
}

#[async_trait]
impl RemoteBackend for AppwriteClient {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> BackendResult<Account> {
        let request = CreateAccountRequest {
            user_id: UNIQUE_ID,
            email,
            password,
            name,
        };
        self.send_json(self.request(Method::POST, "/account").json(&request))
            .await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> BackendResult<Session> {
        let request = CreateSessionRequest { email, password };
        self.send_json(
            self.request(Method::POST, "/account/sessions/email")
                .json(&request),
        )
        .await
    }

    async fn delete_current_session(&self) -> BackendResult<()> {
        self.send(self.request(Method::DELETE, "/account/sessions/current"))
            .await?;
        self.set_session_cookie(None);
        Ok(())
    }

    async fn get_account(&self) -> BackendResult<Account> {
        self.send_json(self.request(Method::GET, "/account")).await
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_query_string()))
            .collect();

        self.send_json(
            self.request(Method::GET, &self.documents_path(collection))
                .query(&params),
        )
        .await
    }

    async fn create_document(&self, collection: &str, data: Value) -> BackendResult<Document> {
        let body = json!({ "documentId": UNIQUE_ID, "data": data });
        self.send_json(
            self.request(Method::POST, &self.documents_path(collection))
                .json(&body),
        )
        .await
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        self.send_json(
            self.request(Method::PATCH, &path)
                .json(&json!({ "data": data })),
        )
        .await
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> BackendResult<()> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn create_file(&self, bucket: &str, asset: &UploadAsset) -> BackendResult<StoredFile> {
        if asset.uri.is_empty() {
            return Err(BackendError::InvalidRequest("File uri is empty".to_string()));
        }

        let path = asset.uri.strip_prefix("file://").unwrap_or(&asset.uri);
        let bytes = tokio::fs::read(path).await?;

        let part = multipart::Part::bytes(bytes)
            .file_name(asset.name.clone())
            .mime_str(&asset.mime_type)?;
        let form = multipart::Form::new()
            .text("fileId", UNIQUE_ID)
            .part("file", part);

        self.send_json(
            self.request(Method::POST, &format!("/storage/buckets/{}/files", bucket))
                .multipart(form),
        )
        .await
    }

    fn file_view_url(&self, bucket: &str, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint, bucket, file_id, self.project_id
        )
    }
}
