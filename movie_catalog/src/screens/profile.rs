//! Profile screen.

use super::BusyFlag;
use crate::{
    access::{AccessError, AccessResult, BestEffort},
    models::{FileAsset, UserProfile},
    session::SessionManager,
};

/// Editable profile fields seeded from the signed-in user
pub struct ProfileEditor {
    pub username: String,
    pub phone: String,
    session: SessionManager,
    saving: BusyFlag,
}

impl ProfileEditor {
    /// Seed the fields from the cached profile, empty when signed out
    pub fn new(session: SessionManager) -> Self {
        let snapshot = session.store().snapshot();
        let (username, phone) = snapshot
            .user()
            .map(|u| (u.username.clone(), u.phone.clone().unwrap_or_default()))
            .unwrap_or_default();

        Self {
            username,
            phone,
            session,
            saving: BusyFlag::default(),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_busy()
    }

    fn current_user(&self) -> AccessResult<UserProfile> {
        self.session
            .store()
            .snapshot()
            .user()
            .cloned()
            .ok_or(AccessError::NotSignedIn)
    }

    /// Write username and phone, then cache the server's document
    ///
    /// # Errors
    ///
    /// * `AccessError::Validation` - Username is blank
    /// * `AccessError::Busy` - A save is already in flight; nothing was sent
    /// * `AccessError::NotSignedIn` - No cached user
    /// * `AccessError::Remote` - The update failed; the cache is untouched
    pub async fn save(&self) -> AccessResult<UserProfile> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AccessError::validation("Username required"));
        }

        let _guard = self.saving.try_begin().ok_or(AccessError::Busy)?;
        let user = self.current_user()?;

        let updated = self
            .session
            .access()
            .update_profile(&user.id, username, Some(self.phone.as_str()))
            .await?;

        self.session.store().replace_user(updated.clone());
        log::info!("Profile updated for {}", updated.username);
        Ok(updated)
    }

    /// Upload a new avatar and link it to the profile
    ///
    /// Two separate remote steps. When linking fails the uploaded file stays
    /// in the bucket and the cached profile keeps its old avatar.
    pub async fn change_avatar(&self, asset: &FileAsset) -> AccessResult<UserProfile> {
        let user = self.current_user()?;
        let access = self.session.access();

        let url = access.upload_file(asset).await?;
        let updated = access.update_user_avatar(&user.id, &url).await?;

        self.session.store().replace_user(updated.clone());
        Ok(updated)
    }

    /// Sign out; the session is cleared even if the backend call fails
    pub async fn logout(&self) -> BestEffort<()> {
        self.session.sign_out().await
    }
}
