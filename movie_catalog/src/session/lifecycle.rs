//! Authentication and session lifecycle.
//!
//! `Unknown -> Checking -> {Authenticated | Anonymous}` at startup, then
//! sign-in, sign-up and sign-out move between the two settled phases. The
//! store only becomes `Authenticated` once an operation has fully
//! succeeded; a failed attempt settles it `Anonymous`.

use super::state::SessionStore;
use crate::{
    access::{AccessError, AccessResult, BackendAccess, BestEffort, FILL_ALL_FIELDS},
    models::UserProfile,
};

/// Drives the session store through the authentication protocols
#[derive(Clone)]
pub struct SessionManager {
    access: BackendAccess,
    store: SessionStore,
}

impl SessionManager {
    /// Create a manager with a fresh store
    pub fn new(access: BackendAccess) -> Self {
        Self::with_store(access, SessionStore::new())
    }

    /// Create a manager over an existing store
    pub fn with_store(access: BackendAccess, store: SessionStore) -> Self {
        Self { access, store }
    }

    pub fn access(&self) -> &BackendAccess {
        &self.access
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Settle the startup phase
    ///
    /// Never fails: any lookup failure ends in `Anonymous`. The outcome says
    /// whether that was expected (no session) or not (e.g. offline).
    pub async fn bootstrap(&self) -> BestEffort<()> {
        self.store.begin_check();

        let outcome = self.access.lookup_current_user().await;
        match &outcome {
            BestEffort::Ok(profile) => {
                log::info!("Restored session for {}", profile.username);
                self.store.set_authenticated(profile.clone());
            }
            BestEffort::Recoverable(e) => {
                log::info!("Starting anonymous: {}", e);
                self.store.clear();
            }
            BestEffort::Fatal(e) => {
                log::error!("Session check failed, starting anonymous: {}", e);
                self.store.clear();
            }
        }

        outcome.map(|_| ())
    }

    /// Sign in and load the user's profile
    ///
    /// # Errors
    ///
    /// * `AccessError::Validation` - Empty email or password; no remote call
    /// * `AccessError::Remote` - Bad credentials or network failure
    /// * `AccessError::ProfileMissing` - Session created but no profile could
    ///   be fetched
    ///
    /// Validation failures leave the store as it was; any later failure
    /// leaves it `Anonymous`.
    pub async fn sign_in(&self, email: &str, password: &str) -> AccessResult<UserProfile> {
        if email.is_empty() || password.is_empty() {
            return Err(AccessError::validation(FILL_ALL_FIELDS));
        }

        // The previous remote session is purged first, so any failure from
        // here on leaves no signed-in user
        if let Err(e) = self.access.sign_in(email, password).await {
            self.store.clear();
            return Err(e);
        }

        let profile = match self.access.lookup_current_user().await {
            BestEffort::Ok(profile) => profile,
            BestEffort::Recoverable(e) | BestEffort::Fatal(e) => {
                log::error!("Signed in as {} but profile lookup failed: {}", email, e);
                self.store.clear();
                return Err(AccessError::ProfileMissing);
            }
        };

        self.store.set_authenticated(profile.clone());
        Ok(profile)
    }

    /// Create an account with a profile and sign in to it
    ///
    /// # Errors
    ///
    /// * `AccessError::Validation` - Any field empty; no remote call
    /// * `AccessError::Remote` - Account or profile creation failed
    /// * `AccessError::SignUpIncomplete` - The account exists remotely but
    ///   signing in failed
    ///
    /// Any failure after validation leaves the store `Anonymous`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> AccessResult<UserProfile> {
        if email.is_empty() || password.is_empty() || username.is_empty() {
            return Err(AccessError::validation(FILL_ALL_FIELDS));
        }

        let profile = match self.access.create_user(email, password, username).await {
            Ok(profile) => profile,
            Err(e) => {
                self.store.clear();
                return Err(e);
            }
        };
        self.store.set_authenticated(profile.clone());
        Ok(profile)
    }

    /// Sign out
    ///
    /// The store is cleared whatever the remote deletion reports; the
    /// outcome is informational only.
    pub async fn sign_out(&self) -> BestEffort<()> {
        let outcome = match self.access.sign_out().await {
            Ok(()) => BestEffort::Ok(()),
            Err(e) => {
                log::warn!("Session deletion failed during sign-out: {}", e);
                BestEffort::from_error(e)
            }
        };

        self.store.clear();
        outcome
    }
}
