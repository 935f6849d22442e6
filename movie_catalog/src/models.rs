//! Catalog data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External (TMDB) movie id
pub type MovieId = i64;

/// Poster image base for relative poster paths
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
/// Shown when a movie has no poster
pub const POSTER_PLACEHOLDER: &str = "https://placehold.co/600x400/1a1a1a/ffffff.png";
/// Shown when a user has no avatar
pub const AVATAR_PLACEHOLDER: &str = "https://placehold.co/200x200/1a1a1a/ffffff.png";

/// Full poster URL for a relative poster path
pub fn poster_image_url(poster_path: Option<&str>) -> String {
    match poster_path.map(|p| p.trim_start_matches('/')) {
        Some(path) if !path.is_empty() => format!("{}/{}", POSTER_BASE_URL, path),
        _ => POSTER_PLACEHOLDER.to_string(),
    }
}

/// User profile document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Avatar URL, or the placeholder when none was uploaded
    pub fn avatar_or_placeholder(&self) -> &str {
        self.avatar
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(AVATAR_PLACEHOLDER)
    }
}

/// "User has saved movie" record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMovie {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub title: String,
    /// Relative poster path as stored
    #[serde(rename = "posterUrl", default)]
    pub poster_url: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SavedMovie {
    pub fn poster_image_url(&self) -> String {
        poster_image_url(self.poster_url.as_deref())
    }
}

/// Search analytics record, one per search term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCount {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub movie_id: MovieId,
    pub title: String,
    pub count: i64,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// Movie reference passed to save and search-count operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Movie as listed by the catalog API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl Movie {
    /// Rating on a five-star scale
    pub fn star_rating(&self) -> i64 {
        (self.vote_average / 2.0).round() as i64
    }

    /// Year part of the release date
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
    }

    pub fn poster_image_url(&self) -> String {
        poster_image_url(self.poster_path.as_deref())
    }

    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
        }
    }
}

/// Locally selected file, as handed over by an image picker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAsset {
    /// Local path or `file://` URI
    pub uri: String,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
}

impl FileAsset {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Fill in upload defaults for missing metadata
    pub fn to_upload(&self, now: DateTime<Utc>) -> UploadAsset {
        UploadAsset {
            uri: self.uri.clone(),
            name: self
                .name
                .clone()
                .unwrap_or_else(|| format!("avatar-{}.jpg", now.timestamp_millis())),
            mime_type: self
                .mime_type
                .clone()
                .unwrap_or_else(|| "image/jpeg".to_string()),
            size: self.size.unwrap_or(0),
        }
    }
}

/// File ready for upload, all metadata resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAsset {
    pub uri: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Video post document created by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPost {
    #[serde(rename = "$id")]
    pub id: String,
    pub creator: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
}
