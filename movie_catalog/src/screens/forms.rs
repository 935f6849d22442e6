//! Sign-in and sign-up forms.

use super::BusyFlag;
use crate::{
    access::{AccessError, AccessResult, FILL_ALL_FIELDS},
    models::UserProfile,
    session::SessionManager,
};

/// Sign-in screen state
#[derive(Debug, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    submitting: BusyFlag,
}

impl SignInForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            submitting: BusyFlag::default(),
        }
    }

    pub fn validate(&self) -> AccessResult<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AccessError::validation(FILL_ALL_FIELDS));
        }
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    /// Validate and sign in
    ///
    /// # Errors
    ///
    /// * `AccessError::Busy` - A submission is already in flight
    /// * Any error of [`SessionManager::sign_in`]
    pub async fn submit(&self, session: &SessionManager) -> AccessResult<UserProfile> {
        self.validate()?;
        let _guard = self.submitting.try_begin().ok_or(AccessError::Busy)?;
        session.sign_in(&self.email, &self.password).await
    }
}

/// Sign-up screen state
#[derive(Debug, Default)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
    submitting: BusyFlag,
}

impl SignUpForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            submitting: BusyFlag::default(),
        }
    }

    pub fn validate(&self) -> AccessResult<()> {
        if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(AccessError::validation(FILL_ALL_FIELDS));
        }
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    /// Validate, create the account and sign in
    pub async fn submit(&self, session: &SessionManager) -> AccessResult<UserProfile> {
        self.validate()?;
        let _guard = self.submitting.try_begin().ok_or(AccessError::Busy)?;
        session
            .sign_up(&self.email, &self.password, &self.username)
            .await
    }
}
