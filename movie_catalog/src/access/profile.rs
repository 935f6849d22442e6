//! Profile, avatar and post operations.

use chrono::Utc;
use serde_json::{Map, Value, json};

use super::{AccessError, AccessResult, BackendAccess, decode};
use crate::{
    backend::Query,
    models::{FileAsset, UserPost, UserProfile},
};

impl BackendAccess {
    /// Upload a local file to the avatar bucket
    ///
    /// # Returns
    ///
    /// * `AccessResult<String>` - Public view URL of the uploaded file
    ///
    /// # Errors
    ///
    /// * `AccessError::Validation` - The asset has no uri; nothing was sent
    /// * `AccessError::Remote` - Reading or uploading the file failed
    pub async fn upload_file(&self, asset: &FileAsset) -> AccessResult<String> {
        if asset.uri.trim().is_empty() {
            return Err(AccessError::validation("Invalid image file"));
        }

        let upload = asset.to_upload(Utc::now());
        let stored = self
            .backend()
            .create_file(&self.collections.storage, &upload)
            .await?;

        let url = self.file_view_url(&stored.id);
        log::info!("Uploaded {} as {}", upload.name, url);
        Ok(url)
    }

    /// Public view URL of a file in the avatar bucket
    pub fn file_view_url(&self, file_id: &str) -> String {
        self.backend()
            .file_view_url(&self.collections.storage, file_id)
    }

    /// Point a profile at a new avatar URL
    ///
    /// Only the `avatar` field is written.
    ///
    /// # Errors
    ///
    /// * `AccessError::Validation` - The URL is not an absolute http(s) URL;
    ///   nothing was sent
    /// * `AccessError::Remote` - The update failed
    pub async fn update_user_avatar(
        &self,
        user_id: &str,
        avatar_url: &str,
    ) -> AccessResult<UserProfile> {
        let valid = reqwest::Url::parse(avatar_url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(AccessError::validation("Avatar URL must be an http(s) URL"));
        }

        let document = self
            .backend()
            .update_document(
                &self.collections.user,
                user_id,
                json!({ "avatar": avatar_url }),
            )
            .await?;

        decode("user profile", &document)
    }

    /// Write username and phone to a profile
    ///
    /// A `None` phone is not sent and keeps its stored value; a blank one is
    /// cleared. Fields not sent (avatar, email, ...) are preserved by the
    /// backend; the returned document is authoritative.
    pub async fn update_profile(
        &self,
        user_id: &str,
        username: &str,
        phone: Option<&str>,
    ) -> AccessResult<UserProfile> {
        let mut data = Map::new();
        data.insert("username".to_string(), json!(username));
        if let Some(phone) = phone {
            let phone = phone.trim();
            let value = if phone.is_empty() { Value::Null } else { json!(phone) };
            data.insert("phone".to_string(), value);
        }

        let document = self
            .backend()
            .update_document(&self.collections.user, user_id, Value::Object(data))
            .await?;

        decode("user profile", &document)
    }

    /// Video posts created by a user; empty on any failure
    pub async fn get_user_posts(&self, user_id: &str) -> Vec<UserPost> {
        let list = match self
            .backend()
            .list_documents(&self.collections.video, &[Query::equal("creator", user_id)])
            .await
        {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Error fetching user posts: {}", e);
                return Vec::new();
            }
        };

        list.documents
            .iter()
            .filter_map(|d| decode::<UserPost>("user post", d).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{MemoryBackend, Operation},
        config::CollectionIds,
    };
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryBackend>, BackendAccess) {
        let backend = Arc::new(MemoryBackend::with_endpoint("https://host/v1", "proj"));
        let access = BackendAccess::new(backend.clone(), CollectionIds::default());
        (backend, access)
    }

    #[tokio::test]
    async fn test_upload_file_returns_view_url() {
        let (backend, access) = setup();
        let url = access
            .upload_file(&FileAsset::new("file:///tmp/me.jpg"))
            .await
            .unwrap();

        let files = backend.files("avatars");
        assert_eq!(files.len(), 1);
        assert_eq!(
            url,
            format!(
                "https://host/v1/storage/buckets/avatars/files/{}/view?project=proj",
                files[0].id
            )
        );
        assert!(files[0].name.starts_with("avatar-"));
    }

    #[tokio::test]
    async fn test_upload_without_uri_makes_no_call() {
        let (backend, access) = setup();
        let err = access.upload_file(&FileAsset::default()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_profile_preserves_avatar() {
        let (backend, access) = setup();
        let doc = backend.seed_document(
            "users",
            json!({
                "accountId": "acc1",
                "email": "a@x.com",
                "username": "alice",
                "avatar": "https://host/a.png",
            }),
        );

        let updated = access
            .update_profile(&doc.id, "alice2", Some("555-0100"))
            .await
            .unwrap();
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.avatar.as_deref(), Some("https://host/a.png"));
    }

    #[tokio::test]
    async fn test_update_profile_without_phone_leaves_it_unset() {
        let (backend, access) = setup();
        let doc = backend.seed_document(
            "users",
            json!({"accountId": "acc1", "email": "a@x.com", "username": "alice"}),
        );

        let updated = access.update_profile(&doc.id, "alice2", None).await.unwrap();
        assert!(updated.phone.is_none());
        assert!(!backend.documents("users")[0].fields.contains_key("phone"));
    }

    #[tokio::test]
    async fn test_update_profile_phone_kept_when_omitted_cleared_when_blank() {
        let (backend, access) = setup();
        let doc = backend.seed_document(
            "users",
            json!({"accountId": "acc1", "email": "a@x.com", "username": "alice", "phone": "555-0100"}),
        );

        let updated = access.update_profile(&doc.id, "alice", None).await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));

        let updated = access.update_profile(&doc.id, "alice", Some("  ")).await.unwrap();
        assert!(updated.phone.is_none());
    }

    #[tokio::test]
    async fn test_user_posts_filtered_and_empty_on_error() {
        let (backend, access) = setup();
        backend.seed_document("videos", json!({"creator": "u1", "title": "Trailer"}));
        backend.seed_document("videos", json!({"creator": "u2", "title": "Other"}));

        let posts = access.get_user_posts("u1").await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title.as_deref(), Some("Trailer"));

        backend.fail_next(Operation::ListDocuments);
        assert!(access.get_user_posts("u1").await.is_empty());
    }
}
