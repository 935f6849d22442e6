//! Saved movies and search analytics.

use chrono::Utc;
use serde_json::json;

use super::{AccessResult, BackendAccess, decode};
use crate::{
    backend::Query,
    models::{MovieId, MovieSummary, SavedMovie, SearchCount, poster_image_url},
};

/// Number of records returned by [`BackendAccess::get_trending_movies`]
pub const TRENDING_LIMIT: u32 = 5;

impl BackendAccess {
    /// Record that a user saved a movie
    pub async fn save_movie(&self, user_id: &str, movie: &MovieSummary) -> AccessResult<SavedMovie> {
        let document = self
            .backend()
            .create_document(
                &self.collections.saved,
                json!({
                    "userId": user_id,
                    "movieId": movie.id,
                    "title": movie.title,
                    "posterUrl": movie.poster_path,
                    "createdAt": Utc::now(),
                }),
            )
            .await?;

        decode("saved movie", &document)
    }

    /// Delete a saved-movie record
    pub async fn unsave_movie(&self, doc_id: &str) -> AccessResult<()> {
        self.backend()
            .delete_document(&self.collections.saved, doc_id)
            .await?;
        Ok(())
    }

    /// Saved record for (user, movie), if any
    pub async fn is_movie_saved(
        &self,
        user_id: &str,
        movie_id: MovieId,
    ) -> AccessResult<Option<SavedMovie>> {
        let list = self
            .backend()
            .list_documents(
                &self.collections.saved,
                &[
                    Query::equal("userId", user_id),
                    Query::equal("movieId", movie_id),
                ],
            )
            .await?;

        list.documents
            .first()
            .map(|d| decode("saved movie", d))
            .transpose()
    }

    /// All saved records of a user
    pub async fn get_saved_movies(&self, user_id: &str) -> AccessResult<Vec<SavedMovie>> {
        let list = self
            .backend()
            .list_documents(&self.collections.saved, &[Query::equal("userId", user_id)])
            .await?;

        list.documents
            .iter()
            .map(|d| decode("saved movie", d))
            .collect()
    }

    /// Count a search for `search_term`, creating its record on first use
    ///
    /// Read-modify-write: concurrent searches of one term can lose increments.
    pub async fn update_search_count(
        &self,
        search_term: &str,
        movie: &MovieSummary,
    ) -> AccessResult<()> {
        let collection = &self.collections.search;
        let list = self
            .backend()
            .list_documents(collection, &[Query::equal("searchTerm", search_term)])
            .await
            .inspect_err(|e| log::error!("Error updating search count: {}", e))?;

        match list.documents.first() {
            Some(document) => {
                let existing: SearchCount = decode("search count", document)?;
                self.backend()
                    .update_document(
                        collection,
                        &existing.id,
                        json!({ "count": existing.count + 1 }),
                    )
                    .await
                    .inspect_err(|e| log::error!("Error updating search count: {}", e))?;
            }
            None => {
                self.backend()
                    .create_document(
                        collection,
                        json!({
                            "searchTerm": search_term,
                            "movie_id": movie.id,
                            "title": movie.title,
                            "count": 1,
                            "poster_url": poster_image_url(movie.poster_path.as_deref()),
                        }),
                    )
                    .await
                    .inspect_err(|e| log::error!("Error creating search count: {}", e))?;
            }
        }

        Ok(())
    }

    /// Most searched terms, highest count first; empty on any failure
    pub async fn get_trending_movies(&self) -> Vec<SearchCount> {
        let list = match self
            .backend()
            .list_documents(
                &self.collections.search,
                &[Query::limit(TRENDING_LIMIT), Query::order_desc("count")],
            )
            .await
        {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Error fetching trending movies: {}", e);
                return Vec::new();
            }
        };

        list.documents
            .iter()
            .filter_map(|d| {
                decode::<SearchCount>("search count", d)
                    .inspect_err(|e| log::warn!("Skipping trending record {}: {}", d.id, e))
                    .ok()
            })
            .collect()
    }
}
