//! Integration tests for the session lifecycle.
//!
//! Covers startup check, sign-in, sign-up and sign-out against the in-memory
//! backend, including failures injected between the steps of each flow.

mod common;

use common::{setup, signed_in};
use movie_catalog::{
    AccessError, BestEffort, Operation, SessionPhase,
    screens::{Route, landing_route},
};
use proptest::prelude::*;

// ============================================================================
// Startup
// ============================================================================

#[tokio::test]
async fn test_bootstrap_restores_existing_session() {
    let (backend, session) = signed_in("alice").await;
    let profile_id = session.store().snapshot().user().unwrap().id.clone();

    // A second manager over the same backend sees the live session
    let restarted = movie_catalog::SessionManager::new(session.access().clone());
    assert_eq!(landing_route(&restarted.store().snapshot()), Route::Splash);

    assert!(restarted.bootstrap().await.is_ok());
    let snapshot = restarted.store().snapshot();
    assert_eq!(snapshot.phase(), SessionPhase::Authenticated);
    assert_eq!(snapshot.user().unwrap().id, profile_id);
    assert_eq!(backend.calls(Operation::GetAccount), 1);
}

#[tokio::test]
async fn test_bootstrap_with_missing_profile_is_anonymous() {
    let (backend, session) = setup();
    // Account and session exist but no profile document was ever written
    backend.fail_next(Operation::CreateDocument);
    let err = session
        .sign_up("bob@example.com", "password123", "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Remote(_)));
    assert!(backend.has_active_session());

    let outcome = session.bootstrap().await;
    assert!(matches!(
        outcome,
        BestEffort::Recoverable(AccessError::ProfileMissing)
    ));
    assert_eq!(landing_route(&session.store().snapshot()), Route::SignIn);
}

#[tokio::test]
async fn test_bootstrap_after_session_expired() {
    let (backend, session) = signed_in("alice").await;
    backend.expire_session();

    let outcome = session.bootstrap().await;
    assert!(matches!(outcome, BestEffort::Recoverable(ref e) if e.is_unauthorized()));
    assert!(!session.store().snapshot().is_logged());
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_sign_in_round_trip() {
    let (backend, session) = signed_in("alice").await;
    session.sign_out().await;

    let profile = session
        .sign_in("alice@example.com", "password123")
        .await
        .expect("sign-in should succeed");
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.email, "alice@example.com");

    let snapshot = session.store().snapshot();
    assert!(snapshot.is_logged());
    assert_eq!(snapshot.user(), Some(&profile));
    assert!(backend.has_active_session());
}

#[tokio::test]
async fn test_sign_in_replaces_active_session() {
    let (backend, session) = signed_in("alice").await;
    let deletes = backend.calls(Operation::DeleteSession);

    // Signing in while signed in deletes the old session first
    session
        .sign_in("alice@example.com", "password123")
        .await
        .expect("sign-in over an active session should succeed");
    assert_eq!(backend.calls(Operation::DeleteSession), deletes + 1);
    assert!(backend.has_active_session());
}

#[tokio::test]
async fn test_sign_in_wrong_password_leaves_store() {
    let (_backend, session) = signed_in("alice").await;
    session.sign_out().await;

    let err = session
        .sign_in("alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.client_message().contains("Invalid credentials"));
    assert_eq!(session.store().snapshot().phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_sign_in_network_failure() {
    let (backend, session) = signed_in("alice").await;
    session.sign_out().await;
    backend.fail_always(Operation::CreateSession);

    let err = session
        .sign_in("alice@example.com", "password123")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Remote(_)));
    assert!(!session.store().snapshot().is_logged());
}

#[tokio::test]
async fn test_failed_sign_in_while_signed_in_ends_anonymous() {
    let (backend, session) = signed_in("alice").await;

    let err = session
        .sign_in("alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());

    // The old remote session was purged, so the store must not keep alice
    assert!(!backend.has_active_session());
    let snapshot = session.store().snapshot();
    assert_eq!(snapshot.phase(), SessionPhase::Anonymous);
    assert!(snapshot.user().is_none());
    assert!(session.access().get_current_user().await.is_none());
}

#[tokio::test]
async fn test_profile_lookup_failure_while_signed_in_ends_anonymous() {
    let (backend, session) = signed_in("alice").await;
    backend.fail_next(Operation::ListDocuments);

    let err = session
        .sign_in("alice@example.com", "password123")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::ProfileMissing));
    assert!(!session.store().snapshot().is_logged());
}

#[tokio::test]
async fn test_validation_failure_while_signed_in_keeps_user() {
    let (backend, session) = signed_in("alice").await;
    let before = backend.total_calls();

    assert!(session.sign_in("", "password123").await.unwrap_err().is_validation());
    assert!(session.store().snapshot().is_logged());
    assert_eq!(backend.total_calls(), before);
}

proptest! {
    #[test]
    fn test_empty_credentials_never_reach_backend(
        (email, password) in prop_oneof![
            "[a-z@.]{0,12}".prop_map(|p| (String::new(), p)),
            "[a-z@.]{0,12}".prop_map(|e| (e, String::new())),
        ]
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let (backend, session) = setup();
            let err = session.sign_in(&email, &password).await.unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.client_message(), "Please fill in all fields");

            let err = session.sign_up(&email, &password, "user").await.unwrap_err();
            assert!(err.is_validation());
            assert_eq!(backend.total_calls(), 0);
        });
    }
}

// ============================================================================
// Sign-up
// ============================================================================

#[tokio::test]
async fn test_sign_up_creates_account_and_profile() {
    let (backend, session) = setup();
    let profile = session
        .sign_up("carol@example.com", "password123", "carol")
        .await
        .expect("sign-up should succeed");

    assert!(backend.has_account("carol@example.com"));
    assert_eq!(backend.documents("users").len(), 1);
    assert_eq!(profile.username, "carol");
    assert!(!profile.account_id.is_empty());
    assert!(profile.avatar.is_none());
    assert!(session.store().snapshot().is_logged());
}

#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let (backend, session) = signed_in("alice").await;
    session.sign_out().await;

    let err = session
        .sign_up("alice@example.com", "password123", "alice2")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Remote(ref e) if e.code() == Some(409)));
    assert_eq!(backend.documents("users").len(), 1);
    assert!(!session.store().snapshot().is_logged());
}

#[tokio::test]
async fn test_sign_up_sign_in_failure_leaves_account_without_profile() {
    let (backend, session) = setup();
    backend.fail_next(Operation::CreateSession);

    let err = session
        .sign_up("dave@example.com", "password123", "dave")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::SignUpIncomplete { .. }));

    // Account exists, no profile, store untouched
    assert!(backend.has_account("dave@example.com"));
    assert!(backend.documents("users").is_empty());
    assert!(!backend.has_active_session());
    assert!(!session.store().snapshot().is_logged());
}

#[tokio::test]
async fn test_incomplete_sign_up_while_signed_in_ends_anonymous() {
    let (backend, session) = signed_in("alice").await;
    backend.fail_next(Operation::CreateSession);

    let err = session
        .sign_up("erin@example.com", "password123", "erin")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::SignUpIncomplete { .. }));
    assert!(!backend.has_active_session());
    assert_eq!(session.store().snapshot().phase(), SessionPhase::Anonymous);
    assert_eq!(landing_route(&session.store().snapshot()), Route::SignIn);
}

// ============================================================================
// Sign-out
// ============================================================================

#[tokio::test]
async fn test_sign_out_twice() {
    let (backend, session) = signed_in("alice").await;

    assert!(session.sign_out().await.is_ok());
    assert!(!backend.has_active_session());

    // Second call has no session to delete; still settles anonymous
    let second = session.sign_out().await;
    assert!(matches!(second, BestEffort::Recoverable(_)));
    assert_eq!(session.store().snapshot().phase(), SessionPhase::Anonymous);
    assert!(session.store().snapshot().user().is_none());
}

#[tokio::test]
async fn test_sign_out_offline_still_clears() {
    let (backend, session) = signed_in("alice").await;
    backend.fail_next(Operation::DeleteSession);

    assert!(session.sign_out().await.is_fatal());
    assert!(!session.store().snapshot().is_logged());
    assert_eq!(landing_route(&session.store().snapshot()), Route::SignIn);
}
