//! Session state container.

use tokio::sync::watch;

use crate::models::UserProfile;

/// Authentication phase of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing checked yet
    Unknown,
    /// Current-user lookup in flight
    Checking,
    /// A user profile is cached
    Authenticated,
    /// No user
    Anonymous,
}

/// Immutable view of the session state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    phase: SessionPhase,
    user: Option<UserProfile>,
}

impl SessionSnapshot {
    fn initial() -> Self {
        Self {
            phase: SessionPhase::Unknown,
            user: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the startup check has not settled yet
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Unknown | SessionPhase::Checking)
    }

    pub fn is_logged(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }
}

/// Process-wide session state
///
/// The only cross-screen mutable resource. Mutations are limited to the
/// named transitions below and always replace the whole user, so
/// `is_logged() == user().is_some()` holds whenever the state is not loading.
/// Cloning yields a handle to the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: watch::Sender<SessionSnapshot>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::initial());
        Self { tx }
    }

    /// Current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Enter `Checking`; the cached user is dropped
    pub fn begin_check(&self) {
        self.tx.send_replace(SessionSnapshot {
            phase: SessionPhase::Checking,
            user: None,
        });
    }

    /// Enter `Authenticated` with the given profile
    pub fn set_authenticated(&self, profile: UserProfile) {
        log::debug!("Session authenticated as {}", profile.username);
        self.tx.send_replace(SessionSnapshot {
            phase: SessionPhase::Authenticated,
            user: Some(profile),
        });
    }

    /// Enter `Anonymous`
    pub fn clear(&self) {
        self.tx.send_replace(SessionSnapshot {
            phase: SessionPhase::Anonymous,
            user: None,
        });
    }

    /// Replace the cached profile of the authenticated user
    ///
    /// Ignored unless authenticated, so a late profile update cannot revive
    /// a signed-out session.
    ///
    /// # Returns
    ///
    /// * `bool` - Whether the profile was replaced
    pub fn replace_user(&self, profile: UserProfile) -> bool {
        self.tx.send_if_modified(|state| {
            if state.phase != SessionPhase::Authenticated {
                return false;
            }
            state.user = Some(profile);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(username: &str) -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            account_id: "acc1".to_string(),
            email: "a@x.com".to_string(),
            username: username.to_string(),
            phone: None,
            avatar: None,
            created_at: None,
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let store = SessionStore::new();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.phase(), SessionPhase::Unknown);
        assert!(snapshot.is_loading());
        assert!(!snapshot.is_logged());
    }

    #[test]
    fn test_transitions_keep_flags_consistent() {
        let store = SessionStore::new();

        store.begin_check();
        assert!(store.snapshot().is_loading());

        store.set_authenticated(profile("alice"));
        let snapshot = store.snapshot();
        assert!(!snapshot.is_loading());
        assert!(snapshot.is_logged());
        assert_eq!(snapshot.user().map(|u| u.username.as_str()), Some("alice"));

        store.clear();
        let snapshot = store.snapshot();
        assert!(!snapshot.is_logged());
        assert!(snapshot.user().is_none());
    }

    #[test]
    fn test_replace_user_requires_authenticated() {
        let store = SessionStore::new();
        store.clear();
        assert!(!store.replace_user(profile("ghost")));
        assert!(store.snapshot().user().is_none());

        store.set_authenticated(profile("alice"));
        assert!(store.replace_user(profile("alice2")));
        assert_eq!(store.snapshot().user().unwrap().username, "alice2");
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        other.set_authenticated(profile("alice"));
        assert!(store.snapshot().is_logged());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.set_authenticated(profile("alice"));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_logged());

        store.clear();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_logged());
    }
}
