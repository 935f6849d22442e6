//! Account and session operations.

use chrono::Utc;
use serde_json::json;

use super::{AccessError, AccessResult, BackendAccess, BestEffort, decode};
use crate::{
    backend::{Query, Session},
    models::UserProfile,
};

impl BackendAccess {
    /// Sign in with email and password
    ///
    /// Any active session is deleted first so the new one is not refused;
    /// failure of that deletion (usually "no session") is ignored.
    ///
    /// # Errors
    ///
    /// * `AccessError::Remote` - Bad credentials or network failure
    pub async fn sign_in(&self, email: &str, password: &str) -> AccessResult<Session> {
        if let Err(e) = self.backend().delete_current_session().await {
            log::debug!("No previous session to delete: {}", e);
        }

        let session = self
            .backend()
            .create_email_session(email, password)
            .await
            .inspect_err(|e| log::warn!("Error signing in: {}", e))?;

        log::info!("Session {} created for account {}", session.id, session.user_id);
        Ok(session)
    }

    /// Create an account, sign in to it and create its profile
    ///
    /// # Returns
    ///
    /// * `AccessResult<UserProfile>` - The newly created profile
    ///
    /// # Errors
    ///
    /// * `AccessError::Remote` - Duplicate email, policy violation, or the
    ///   profile document could not be created
    /// * `AccessError::SignUpIncomplete` - The account exists but signing in
    ///   to it failed; the account is not removed
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> AccessResult<UserProfile> {
        let account = self
            .backend()
            .create_account(email, password, username)
            .await
            .inspect_err(|e| log::warn!("Error creating account: {}", e))?;

        if let Err(e) = self.sign_in(email, password).await {
            log::error!(
                "Account {} created but sign-in failed, account left without profile",
                account.id
            );
            return Err(AccessError::SignUpIncomplete {
                account_id: account.id,
                source: Box::new(e),
            });
        }

        let document = self
            .backend()
            .create_document(
                &self.collections.user,
                json!({
                    "accountId": account.id,
                    "email": email,
                    "username": username,
                    "createdAt": Utc::now(),
                }),
            )
            .await
            .inspect_err(|e| log::error!("Error creating user profile: {}", e))?;

        decode("user profile", &document)
    }

    /// Delete the active session
    ///
    /// # Errors
    ///
    /// * `AccessError::Remote` - No active session or network failure
    pub async fn sign_out(&self) -> AccessResult<()> {
        self.backend().delete_current_session().await?;
        Ok(())
    }

    /// Look up the profile behind the active session
    ///
    /// No session and a missing profile row are `Recoverable`; transport
    /// failures and undecodable profiles are `Fatal`.
    pub async fn lookup_current_user(&self) -> BestEffort<UserProfile> {
        let account = match self.backend().get_account().await {
            Ok(account) => account,
            Err(e) => return BestEffort::from_error(e.into()),
        };

        let list = match self
            .backend()
            .list_documents(
                &self.collections.user,
                &[Query::equal("accountId", account.id.as_str())],
            )
            .await
        {
            Ok(list) => list,
            Err(e) => return BestEffort::from_error(e.into()),
        };

        let Some(document) = list.documents.first() else {
            log::warn!("Account {} has no profile document", account.id);
            return BestEffort::Recoverable(AccessError::ProfileMissing);
        };

        match decode("user profile", document) {
            Ok(profile) => BestEffort::Ok(profile),
            Err(e) => BestEffort::Fatal(e),
        }
    }

    /// Profile behind the active session, `None` on any failure
    pub async fn get_current_user(&self) -> Option<UserProfile> {
        match self.lookup_current_user().await {
            BestEffort::Ok(profile) => Some(profile),
            BestEffort::Recoverable(e) => {
                log::debug!("No current user: {}", e);
                None
            }
            BestEffort::Fatal(e) => {
                log::error!("Current user lookup failed: {}", e);
                None
            }
        }
    }
}
