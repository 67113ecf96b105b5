//! Ingest configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::engine::DEFAULT_PROGRESS_EVERY;
use crate::error::{IngestError, Result};

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/moviedb";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Rows per batched insert
pub const DEFAULT_BATCH_SIZE: usize = 2000;

pub const DEFAULT_VALUE_CACHE_CAPACITY: usize = 100_000;
pub const DEFAULT_GENRE_CACHE_CAPACITY: usize = 200;
pub const DEFAULT_LANGUAGE_CACHE_CAPACITY: usize = 200;
pub const DEFAULT_COUNTRY_CACHE_CAPACITY: usize = 2000;
pub const DEFAULT_COMPANY_CACHE_CAPACITY: usize = 20_000;
pub const DEFAULT_KEYWORD_CACHE_CAPACITY: usize = 50_000;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TMDB_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TMDB_RETRY_BACKOFF_MS: u64 = 500;

/// Dedup cache sizes per attribute writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCapacities {
    /// Every string-valued lookup (titles, names, jobs, ...)
    pub values: usize,
    pub genres: usize,
    pub languages: usize,
    pub countries: usize,
    pub companies: usize,
    pub keywords: usize,
}

impl Default for CacheCapacities {
    fn default() -> Self {
        Self {
            values: DEFAULT_VALUE_CACHE_CAPACITY,
            genres: DEFAULT_GENRE_CACHE_CAPACITY,
            languages: DEFAULT_LANGUAGE_CACHE_CAPACITY,
            countries: DEFAULT_COUNTRY_CACHE_CAPACITY,
            companies: DEFAULT_COMPANY_CACHE_CAPACITY,
            keywords: DEFAULT_KEYWORD_CACHE_CAPACITY,
        }
    }
}

/// TheMovieDB API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub base_url: String,
    /// Sent as the `api_key` query parameter
    pub api_token: String,
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub retry_backoff_ms: u64,
    /// Stop paging after this many listing pages (None = all)
    pub max_pages: Option<u32>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            api_token: String::new(),
            timeout_secs: DEFAULT_TMDB_TIMEOUT_SECS,
            max_retries: DEFAULT_TMDB_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_TMDB_RETRY_BACKOFF_MS,
            max_pages: None,
        }
    }
}

impl TmdbConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(IngestError::Config("TMDB base URL cannot be empty".to_string()));
        }
        if self.api_token.is_empty() {
            return Err(IngestError::Config("TMDB_API_TOKEN is not set".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(IngestError::Config("TMDB timeout must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub batch_size: usize,
    pub progress_every: usize,
    pub caches: CacheCapacities,
    pub tmdb: TmdbConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            batch_size: DEFAULT_BATCH_SIZE,
            progress_every: DEFAULT_PROGRESS_EVERY,
            caches: CacheCapacities::default(),
            tmdb: TmdbConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Read settings from the environment over the defaults.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            batch_size: env_or("INGEST_BATCH_SIZE", defaults.batch_size)?,
            progress_every: env_or("INGEST_PROGRESS_EVERY", defaults.progress_every)?,
            caches: CacheCapacities {
                values: env_or("INGEST_VALUE_CACHE_CAPACITY", defaults.caches.values)?,
                genres: env_or("INGEST_GENRE_CACHE_CAPACITY", defaults.caches.genres)?,
                languages: env_or("INGEST_LANGUAGE_CACHE_CAPACITY", defaults.caches.languages)?,
                countries: env_or("INGEST_COUNTRY_CACHE_CAPACITY", defaults.caches.countries)?,
                companies: env_or("INGEST_COMPANY_CACHE_CAPACITY", defaults.caches.companies)?,
                keywords: env_or("INGEST_KEYWORD_CACHE_CAPACITY", defaults.caches.keywords)?,
            },
            tmdb: TmdbConfig {
                base_url: std::env::var("TMDB_BASE_URL").unwrap_or(defaults.tmdb.base_url),
                api_token: std::env::var("TMDB_API_TOKEN").unwrap_or_default(),
                timeout_secs: env_or("TMDB_TIMEOUT_SECS", defaults.tmdb.timeout_secs)?,
                max_retries: env_or("TMDB_MAX_RETRIES", defaults.tmdb.max_retries)?,
                retry_backoff_ms: env_or("TMDB_RETRY_BACKOFF_MS", defaults.tmdb.retry_backoff_ms)?,
                max_pages: env_opt("TMDB_MAX_PAGES")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks shared by every load. TMDB settings are checked by the client.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(IngestError::Config("Database URL cannot be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(IngestError::Config(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(IngestError::Config("Batch size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    Ok(env_opt(key)?.unwrap_or(default))
}

fn env_opt<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| IngestError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_are_valid() {
        let config = IngestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 2000);
        assert_eq!(config.progress_every, 500);
        assert_eq!(config.caches.genres, 200);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = IngestConfig {
            batch_size: 0,
            ..IngestConfig::default()
        };
        assert!(matches!(config.validate(), Err(IngestError::Config(_))));
    }

    #[test]
    fn test_tmdb_requires_token() {
        let tmdb = TmdbConfig::default();
        assert!(tmdb.validate().is_err());

        let tmdb = TmdbConfig {
            api_token: "token".to_string(),
            ..TmdbConfig::default()
        };
        assert!(tmdb.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        std::env::set_var("INGEST_BATCH_SIZE", "250");
        std::env::set_var("TMDB_MAX_PAGES", "3");
        let config = IngestConfig::from_env();
        std::env::remove_var("INGEST_BATCH_SIZE");
        std::env::remove_var("TMDB_MAX_PAGES");

        let config = config.unwrap();
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.tmdb.max_pages, Some(3));
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        std::env::set_var("INGEST_BATCH_SIZE", "lots");
        let config = IngestConfig::from_env();
        std::env::remove_var("INGEST_BATCH_SIZE");

        assert!(matches!(config, Err(IngestError::Config(_))));
    }
}
