//! Integration tests for the command shell over the in-memory backend.
//!
//! Commands are parsed from text exactly as typed at the prompt.

use mc_client::{commands::parse_command, shell::Shell};
use movie_catalog::{BackendAccess, CollectionIds, MemoryBackend, Operation, SessionManager};
use std::sync::Arc;

fn demo_shell() -> (Arc<MemoryBackend>, Shell) {
    let backend = Arc::new(MemoryBackend::new());
    let access = BackendAccess::new(backend.clone(), CollectionIds::default());
    (backend, Shell::new(SessionManager::new(access)))
}

async fn run(shell: &mut Shell, input: &str) -> Vec<String> {
    let command = parse_command(input).expect("command should parse");
    shell.execute(command).await
}

#[tokio::test]
async fn test_start_lands_on_sign_in() {
    let (_backend, mut shell) = demo_shell();
    let lines = shell.start().await;
    assert_eq!(lines, vec!["Not signed in. Use 'signin' or 'signup'"]);
}

#[tokio::test]
async fn test_start_reports_offline_backend() {
    let (backend, mut shell) = demo_shell();
    backend.fail_next(Operation::GetAccount);

    let lines = shell.start().await;
    assert!(lines[0].starts_with("Warning: could not check the session"));
    assert!(!shell.session().store().snapshot().is_logged());
}

#[tokio::test]
async fn test_sign_up_whoami_sign_out() {
    let (backend, mut shell) = demo_shell();
    shell.start().await;

    let lines = run(&mut shell, "signup alice alice@example.com password123").await;
    assert_eq!(lines, vec!["Welcome, alice!"]);

    let lines = run(&mut shell, "whoami").await;
    assert_eq!(lines[0], "Signed in as alice <alice@example.com>");
    assert!(lines[1].contains("placehold.co"));

    let lines = run(&mut shell, "signout").await;
    assert_eq!(lines, vec!["Not signed in. Use 'signin' or 'signup'"]);
    assert!(!backend.has_active_session());
    assert_eq!(run(&mut shell, "whoami").await, vec!["Not signed in"]);
}

#[tokio::test]
async fn test_errors_are_reported_not_fatal() {
    let (_backend, mut shell) = demo_shell();
    shell.start().await;

    let lines = run(&mut shell, "signin ghost@example.com nope").await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Error: Invalid credentials"));

    let lines = run(&mut shell, "saved").await;
    assert_eq!(lines, vec!["Error: You need to sign in first"]);
}

#[tokio::test]
async fn test_movie_toggle_and_saved_list() {
    let (backend, mut shell) = demo_shell();
    run(&mut shell, "signup alice alice@example.com password123").await;

    let lines = run(&mut shell, "movie 550 Fight Club --poster /fc.jpg").await;
    assert_eq!(
        lines,
        vec!["#550 Fight Club 0/5 [not saved]  https://image.tmdb.org/t/p/w500/fc.jpg"]
    );

    assert_eq!(run(&mut shell, "toggle 550").await, vec!["Saved Fight Club"]);
    assert!(shell.saved_ids().contains(550));
    assert_eq!(backend.documents("saved").len(), 1);

    let lines = run(&mut shell, "saved").await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("#550 Fight Club"));

    assert_eq!(run(&mut shell, "unsave 550").await, vec!["Removed Fight Club"]);
    assert!(!shell.saved_ids().contains(550));
    assert!(backend.documents("saved").is_empty());

    let lines = run(&mut shell, "saved").await;
    assert_eq!(lines[0], "No saved movies yet");
}

#[tokio::test]
async fn test_movie_card_shows_rating_and_year() {
    let (_backend, mut shell) = demo_shell();

    let lines = run(
        &mut shell,
        "movie 550 Fight Club --rating 8.4 --released 1999-10-15 --poster /fc.jpg",
    )
    .await;
    assert_eq!(
        lines,
        vec!["#550 Fight Club (1999) 4/5 [not saved]  https://image.tmdb.org/t/p/w500/fc.jpg"]
    );
}

#[tokio::test]
async fn test_failed_sign_in_clears_signed_in_state() {
    let (backend, mut shell) = demo_shell();
    run(&mut shell, "signup alice alice@example.com password123").await;
    run(&mut shell, "movie 550 Fight Club").await;
    run(&mut shell, "toggle 550").await;
    assert!(shell.saved_ids().contains(550));

    let lines = run(&mut shell, "signin alice@example.com wrongpass").await;
    assert!(lines[0].starts_with("Error: Invalid credentials"));
    assert!(!backend.has_active_session());
    assert_eq!(run(&mut shell, "whoami").await, vec!["Not signed in"]);
    assert!(shell.saved_ids().ids().is_empty());

    let lines = run(&mut shell, "toggle 550").await;
    assert_eq!(lines, vec!["Error: You need to sign in first"]);
}

#[tokio::test]
async fn test_toggle_requires_open_card() {
    let (_backend, mut shell) = demo_shell();
    run(&mut shell, "signup alice alice@example.com password123").await;

    let lines = run(&mut shell, "toggle 42").await;
    assert!(lines[0].contains("Movie 42 is not open"));
}

#[tokio::test]
async fn test_search_and_trending() {
    let (_backend, mut shell) = demo_shell();

    for _ in 0..3 {
        run(&mut shell, "search batman 268 The Batman").await;
    }
    run(&mut shell, "search joker 475557 Joker").await;

    let lines = run(&mut shell, "trending").await;
    assert_eq!(
        lines,
        vec![
            "1. batman (3 searches) #268 The Batman",
            "2. joker (1 searches) #475557 Joker",
        ]
    );
}

#[tokio::test]
async fn test_search_records_poster_url() {
    let (backend, mut shell) = demo_shell();

    let lines = run(&mut shell, "search batman 268 The Batman --poster /tb.jpg").await;
    assert_eq!(lines, vec!["Counted search 'batman' -> The Batman"]);

    let docs = backend.documents("searches");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].fields["title"], "The Batman");
    assert_eq!(
        docs[0].fields["poster_url"],
        "https://image.tmdb.org/t/p/w500/tb.jpg"
    );
}

#[tokio::test]
async fn test_trending_when_backend_down() {
    let (backend, mut shell) = demo_shell();
    backend.fail_always(Operation::ListDocuments);
    assert_eq!(run(&mut shell, "trending").await, vec!["No trending movies"]);
}

#[tokio::test]
async fn test_profile_update() {
    let (_backend, mut shell) = demo_shell();
    run(&mut shell, "signup alice alice@example.com password123").await;

    let lines = run(&mut shell, "profile alice2 555-0100").await;
    assert_eq!(lines, vec!["Profile updated: alice2"]);

    let lines = run(&mut shell, "whoami").await;
    assert_eq!(lines[0], "Signed in as alice2 <alice@example.com>");
    assert_eq!(lines[2], "Phone: 555-0100");
}

#[tokio::test]
async fn test_posts_empty() {
    let (_backend, mut shell) = demo_shell();
    run(&mut shell, "signup alice alice@example.com password123").await;
    assert_eq!(run(&mut shell, "posts").await, vec!["No posts yet"]);
}
