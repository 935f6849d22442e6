//! Backend connection configuration.
//!
//! Consolidates all environment variable reads and provides validated configuration.

/// Platform identifier used when `APPWRITE_PLATFORM` is not set
pub const DEFAULT_PLATFORM: &str = "com.jsm.movieapp";

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Backend endpoint URL (e.g. `https://cloud.appwrite.io/v1`)
    pub endpoint: String,
    /// Platform identifier registered with the backend project
    pub platform: String,
    /// Backend project id
    pub project_id: String,
    /// Database holding every collection below
    pub database_id: String,
    /// Collection and bucket ids
    pub collections: CollectionIds,
}

/// Collection and storage bucket ids used by the access layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionIds {
    /// User profile documents
    pub user: String,
    /// Search-count analytics documents
    pub search: String,
    /// User video posts
    pub video: String,
    /// Saved-movie records
    pub saved: String,
    /// File storage bucket for avatars
    pub storage: String,
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            user: "users".to_string(),
            search: "searches".to_string(),
            video: "videos".to_string(),
            saved: "saved".to_string(),
            storage: "avatars".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables
    ///
    /// # Returns
    ///
    /// * `Result<CatalogConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values count as missing.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &str, hint: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingRequired {
                    var: var.to_string(),
                    hint: hint.to_string(),
                })
        };

        let endpoint = required(
            "APPWRITE_ENDPOINT",
            "Backend API root, e.g. https://cloud.appwrite.io/v1",
        )?;
        let project_id = required("APPWRITE_PROJECT_ID", "Project settings > Project ID")?;
        let database_id = required("APPWRITE_DATABASE_ID", "Databases > Database ID")?;

        let collections = CollectionIds {
            user: required("APPWRITE_USER_COLLECTION_ID", "Collection holding user profiles")?,
            search: required(
                "APPWRITE_SEARCH_COLLECTION_ID",
                "Collection holding search counts",
            )?,
            video: required("APPWRITE_VIDEO_COLLECTION_ID", "Collection holding user posts")?,
            saved: required(
                "APPWRITE_SAVED_COLLECTION_ID",
                "Collection holding saved movies",
            )?,
            storage: required("APPWRITE_STORAGE_ID", "Storage > Bucket ID")?,
        };

        let platform = lookup("APPWRITE_PLATFORM")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

        Ok(CatalogConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            platform,
            project_id,
            database_id,
            collections,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = reqwest::Url::parse(&self.endpoint).map_err(|e| ConfigError::Invalid {
            var: "APPWRITE_ENDPOINT".to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                var: "APPWRITE_ENDPOINT".to_string(),
                reason: format!("Unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        if self.platform.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                var: "APPWRITE_PLATFORM".to_string(),
                reason: "Must not contain whitespace".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
