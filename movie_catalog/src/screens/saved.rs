//! Saved-movie surfaces: the movie card toggle, the saved tab, and a shared
//! cache of saved ids.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::BusyFlag;
use crate::{
    access::{AccessResult, BackendAccess},
    models::{MovieId, MovieSummary, SavedMovie, UserProfile},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Result of a toggle attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// A saved record was created
    Saved(SavedMovie),
    /// The saved record was deleted
    Unsaved,
    /// Nothing happened: no user, or a toggle was already running
    Skipped,
}

/// Save/unsave control of one movie card
///
/// Holds the saved record last seen for the movie. The `loading` flag is
/// held from the first remote call until the local state is updated, so a
/// re-entrant toggle cannot create a second record for the same movie.
pub struct SavedToggle {
    access: BackendAccess,
    movie: MovieSummary,
    saved: Mutex<Option<SavedMovie>>,
    loading: BusyFlag,
}

impl SavedToggle {
    pub fn new(access: BackendAccess, movie: MovieSummary) -> Self {
        Self {
            access,
            movie,
            saved: Mutex::new(None),
            loading: BusyFlag::default(),
        }
    }

    pub fn movie(&self) -> &MovieSummary {
        &self.movie
    }

    pub fn is_saved(&self) -> bool {
        lock(&self.saved).is_some()
    }

    pub fn saved_record(&self) -> Option<SavedMovie> {
        lock(&self.saved).clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    /// Reload the saved record for `user`
    ///
    /// Without a user nothing is fetched and the current state is returned.
    pub async fn refresh(&self, user: Option<&UserProfile>) -> AccessResult<bool> {
        let Some(user) = user else {
            return Ok(self.is_saved());
        };

        let record = self.access.is_movie_saved(&user.id, self.movie.id).await?;
        let saved = record.is_some();
        *lock(&self.saved) = record;
        Ok(saved)
    }

    /// Delete the saved record if there is one, otherwise create one
    ///
    /// On error the local state is left as it was.
    pub async fn toggle(&self, user: Option<&UserProfile>) -> AccessResult<ToggleOutcome> {
        let Some(user) = user else {
            return Ok(ToggleOutcome::Skipped);
        };
        let Some(_guard) = self.loading.try_begin() else {
            return Ok(ToggleOutcome::Skipped);
        };

        match self.saved_record() {
            Some(record) => {
                self.access.unsave_movie(&record.id).await?;
                *lock(&self.saved) = None;
                Ok(ToggleOutcome::Unsaved)
            }
            None => {
                let record = self.access.save_movie(&user.id, &self.movie).await?;
                *lock(&self.saved) = Some(record.clone());
                Ok(ToggleOutcome::Saved(record))
            }
        }
    }
}

/// Saved tab: the user's saved records as last fetched
pub struct SavedList {
    access: BackendAccess,
    movies: Mutex<Vec<SavedMovie>>,
}

impl SavedList {
    pub fn new(access: BackendAccess) -> Self {
        Self {
            access,
            movies: Mutex::new(Vec::new()),
        }
    }

    /// Replace the list with a fresh fetch
    ///
    /// On error the previous list is kept.
    pub async fn refresh(&self, user_id: &str) -> AccessResult<Vec<SavedMovie>> {
        let movies = self.access.get_saved_movies(user_id).await?;
        *lock(&self.movies) = movies.clone();
        Ok(movies)
    }

    /// Delete a record remotely, then drop it from the list
    pub async fn unsave(&self, doc_id: &str) -> AccessResult<()> {
        self.access.unsave_movie(doc_id).await?;
        lock(&self.movies).retain(|m| m.id != doc_id);
        Ok(())
    }

    pub fn movies(&self) -> Vec<SavedMovie> {
        lock(&self.movies).clone()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.movies).is_empty()
    }
}

/// Saved movie ids shared between surfaces
///
/// Purely local; the backend remains the source of truth.
#[derive(Debug, Clone, Default)]
pub struct SavedIds {
    ids: Arc<Mutex<BTreeSet<MovieId>>>,
}

impl SavedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, movie_id: MovieId) {
        lock(&self.ids).insert(movie_id);
    }

    pub fn remove(&self, movie_id: MovieId) {
        lock(&self.ids).remove(&movie_id);
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        lock(&self.ids).contains(&movie_id)
    }

    /// Ids in ascending order
    pub fn ids(&self) -> Vec<MovieId> {
        lock(&self.ids).iter().copied().collect()
    }

    /// Replace the cache with the movies of the given records
    pub fn sync(&self, saved: &[SavedMovie]) {
        *lock(&self.ids) = saved.iter().map(|s| s.movie_id).collect();
    }
}
