//! Command execution over the movie catalog screens.
//!
//! The shell owns one instance of each screen view-model and turns every
//! command into the lines the front end should print. Failures never abort
//! the shell; they are reported as `Error: <message>` lines.

use std::collections::HashMap;

use movie_catalog::{
    AccessError, AccessResult, BestEffort, FileAsset, Movie, MovieSummary, SessionManager,
    UserProfile,
    models::MovieId,
    screens::{
        ProfileEditor, Route, SavedIds, SavedList, SavedToggle, SignInForm, SignUpForm,
        ToggleOutcome, landing_route,
    },
};

use crate::commands::{ClientCommand, USAGE};

/// Movie details shown on a card, with its save control
struct Card {
    movie: Movie,
    toggle: SavedToggle,
}

pub struct Shell {
    session: SessionManager,
    saved: SavedList,
    saved_ids: SavedIds,
    cards: HashMap<MovieId, Card>,
}

impl Shell {
    pub fn new(session: SessionManager) -> Self {
        let access = session.access().clone();
        Self {
            session,
            saved: SavedList::new(access),
            saved_ids: SavedIds::new(),
            cards: HashMap::new(),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn saved_ids(&self) -> &SavedIds {
        &self.saved_ids
    }

    /// Settle the session and describe where the user landed
    pub async fn start(&mut self) -> Vec<String> {
        let outcome = self.session.bootstrap().await;
        let mut lines = Vec::new();
        if let BestEffort::Fatal(e) = &outcome {
            lines.push(format!("Warning: could not check the session: {}", e));
        }

        lines.push(self.landing_line());
        if self.current_user().is_ok() {
            self.sync_saved_ids().await;
        }
        lines
    }

    /// Run one command
    pub async fn execute(&mut self, command: ClientCommand) -> Vec<String> {
        match self.run(command).await {
            Ok(lines) => lines,
            Err(e) => vec![format!("Error: {}", e.client_message())],
        }
    }

    async fn run(&mut self, command: ClientCommand) -> AccessResult<Vec<String>> {
        match command {
            ClientCommand::SignIn { email, password } => {
                let result = SignInForm::new(email, password)
                    .submit(&self.session)
                    .await;
                let profile = self.after_auth_attempt(result).await?;
                Ok(vec![format!("Welcome back, {}!", profile.username)])
            }
            ClientCommand::SignUp {
                username,
                email,
                password,
            } => {
                let result = SignUpForm::new(username, email, password)
                    .submit(&self.session)
                    .await;
                let profile = self.after_auth_attempt(result).await?;
                Ok(vec![format!("Welcome, {}!", profile.username)])
            }
            ClientCommand::SignOut => {
                let outcome = ProfileEditor::new(self.session.clone()).logout().await;
                self.on_signed_out();
                let mut lines = Vec::new();
                if outcome.is_fatal() {
                    lines.push("Warning: the server did not confirm sign-out".to_string());
                }
                lines.push(self.landing_line());
                Ok(lines)
            }
            ClientCommand::WhoAmI => match self.current_user() {
                Ok(user) => Ok(describe_user(&user)),
                Err(_) => Ok(vec!["Not signed in".to_string()]),
            },
            ClientCommand::Profile { username, phone } => {
                self.current_user()?;
                let mut editor = ProfileEditor::new(self.session.clone());
                editor.username = username;
                if let Some(phone) = phone {
                    editor.phone = phone;
                }
                let updated = editor.save().await?;
                Ok(vec![format!("Profile updated: {}", updated.username)])
            }
            ClientCommand::Avatar { path } => {
                let editor = ProfileEditor::new(self.session.clone());
                let updated = editor.change_avatar(&FileAsset::new(path)).await?;
                Ok(vec![format!(
                    "Profile image updated: {}",
                    updated.avatar_or_placeholder()
                )])
            }
            ClientCommand::Movie {
                id,
                title,
                poster_path,
                vote_average,
                release_date,
            } => {
                let movie = Movie {
                    id,
                    title,
                    poster_path,
                    vote_average: vote_average.unwrap_or_default(),
                    release_date,
                };
                let user = self.current_user().ok();
                let toggle = SavedToggle::new(self.session.access().clone(), movie.summary());
                toggle.refresh(user.as_ref()).await?;
                let card = Card { movie, toggle };
                let line = describe_card(&card);
                self.cards.insert(id, card);
                Ok(vec![line])
            }
            ClientCommand::Toggle { id } => {
                let user = self.current_user()?;
                let card = self.cards.get(&id).ok_or_else(|| {
                    AccessError::validation(format!(
                        "Movie {} is not open. Use 'movie {} TITLE' first",
                        id, id
                    ))
                })?;

                let line = match card.toggle.toggle(Some(&user)).await? {
                    ToggleOutcome::Saved(record) => {
                        self.saved_ids.add(record.movie_id);
                        format!("Saved {}", record.title)
                    }
                    ToggleOutcome::Unsaved => {
                        self.saved_ids.remove(id);
                        format!("Removed {}", card.movie.title)
                    }
                    ToggleOutcome::Skipped => "Already updating, try again".to_string(),
                };
                Ok(vec![line])
            }
            ClientCommand::Saved => {
                let user = self.current_user()?;
                let movies = self.saved.refresh(&user.id).await?;
                self.saved_ids.sync(&movies);
                if self.saved.is_empty() {
                    return Ok(vec![
                        "No saved movies yet".to_string(),
                        "Save movies and they'll appear here".to_string(),
                    ]);
                }
                Ok(movies
                    .iter()
                    .map(|m| format!("#{} {}  {}", m.movie_id, m.title, m.poster_image_url()))
                    .collect())
            }
            ClientCommand::Unsave { id } => {
                let user = self.current_user()?;
                let record = self
                    .saved
                    .refresh(&user.id)
                    .await?
                    .into_iter()
                    .find(|m| m.movie_id == id)
                    .ok_or_else(|| AccessError::validation(format!("Movie {} is not saved", id)))?;

                self.saved.unsave(&record.id).await?;
                self.saved_ids.remove(id);
                if let Some(card) = self.cards.get(&id) {
                    card.toggle.refresh(Some(&user)).await?;
                }
                Ok(vec![format!("Removed {}", record.title)])
            }
            ClientCommand::Search {
                term,
                id,
                title,
                poster_path,
            } => {
                let movie = MovieSummary {
                    id,
                    title,
                    poster_path,
                };
                self.session
                    .access()
                    .update_search_count(&term, &movie)
                    .await?;
                Ok(vec![format!("Counted search '{}' -> {}", term, movie.title)])
            }
            ClientCommand::Trending => {
                let trending = self.session.access().get_trending_movies().await;
                if trending.is_empty() {
                    return Ok(vec!["No trending movies".to_string()]);
                }
                Ok(trending
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        format!(
                            "{}. {} ({} searches) #{} {}",
                            i + 1,
                            t.search_term,
                            t.count,
                            t.movie_id,
                            t.title
                        )
                    })
                    .collect())
            }
            ClientCommand::Posts => {
                let user = self.current_user()?;
                let posts = self.session.access().get_user_posts(&user.id).await;
                if posts.is_empty() {
                    return Ok(vec!["No posts yet".to_string()]);
                }
                Ok(posts
                    .iter()
                    .map(|p| p.title.clone().unwrap_or_else(|| p.id.clone()))
                    .collect())
            }
            ClientCommand::Help => Ok(USAGE.lines().map(str::to_string).collect()),
            ClientCommand::Quit => Ok(vec!["Goodbye!".to_string()]),
        }
    }

    fn current_user(&self) -> AccessResult<UserProfile> {
        self.session
            .store()
            .snapshot()
            .user()
            .cloned()
            .ok_or(AccessError::NotSignedIn)
    }

    fn landing_line(&self) -> String {
        let snapshot = self.session.store().snapshot();
        match landing_route(&snapshot) {
            Route::Splash => "Loading...".to_string(),
            Route::SignIn => "Not signed in. Use 'signin' or 'signup'".to_string(),
            Route::Tabs => match snapshot.user() {
                Some(user) => format!("Signed in as {}", user.username),
                None => "Signed in".to_string(),
            },
        }
    }

    /// Bring local state in line with the store after sign-in or sign-up
    ///
    /// A failed attempt may still have ended the previous session.
    async fn after_auth_attempt(
        &mut self,
        result: AccessResult<UserProfile>,
    ) -> AccessResult<UserProfile> {
        match result {
            Ok(profile) => {
                self.on_signed_in().await;
                Ok(profile)
            }
            Err(e) => {
                if !self.session.store().snapshot().is_logged() {
                    self.on_signed_out();
                }
                Err(e)
            }
        }
    }

    async fn on_signed_in(&mut self) {
        self.sync_saved_ids().await;
        let user = self.current_user().ok();
        for card in self.cards.values() {
            if let Err(e) = card.toggle.refresh(user.as_ref()).await {
                log::warn!("Failed to refresh movie {}: {}", card.movie.id, e);
            }
        }
    }

    fn on_signed_out(&mut self) {
        self.saved_ids.sync(&[]);
        self.cards.clear();
    }

    async fn sync_saved_ids(&mut self) {
        let Ok(user) = self.current_user() else {
            return;
        };
        match self.saved.refresh(&user.id).await {
            Ok(movies) => self.saved_ids.sync(&movies),
            Err(e) => log::warn!("Failed to load saved movies: {}", e),
        }
    }
}

fn describe_user(user: &UserProfile) -> Vec<String> {
    let mut lines = vec![
        format!("Signed in as {} <{}>", user.username, user.email),
        format!("Avatar: {}", user.avatar_or_placeholder()),
    ];
    if let Some(phone) = user.phone.as_deref().filter(|p| !p.is_empty()) {
        lines.push(format!("Phone: {}", phone));
    }
    lines
}

fn describe_card(card: &Card) -> String {
    let movie = &card.movie;
    let year = movie
        .release_year()
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    format!(
        "#{} {}{} {}/5 [{}]  {}",
        movie.id,
        movie.title,
        year,
        movie.star_rating(),
        if card.toggle.is_saved() { "saved" } else { "not saved" },
        movie.poster_image_url()
    )
}
