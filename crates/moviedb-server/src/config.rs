//! Server configuration
//!
//! Read from the environment (after `.env`) over built-in defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `MOVIEDB_HOST` / `MOVIEDB_PORT` | `127.0.0.1` / `5000` |
//! | `MOVIEDB_SHUTDOWN_TIMEOUT` | `30` seconds |
//! | `MOVIEDB_DEFAULT_LIMIT` | `1000` rows |
//! | `DATABASE_URL` | `postgresql://localhost/moviedb` |
//! | `DB_MAX_CONNECTIONS` / `DB_MIN_CONNECTIONS` | `10` / `1` |
//! | `DB_CONNECT_TIMEOUT` / `DB_IDLE_TIMEOUT` | `10` / `600` seconds |
//! | `CORS_ALLOWED_ORIGINS` | any origin |

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 5000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Rows returned when a request carries no `limit`
pub const DEFAULT_RESULT_LIMIT: i64 = 1000;

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/moviedb";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub default_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Empty or `*` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cors: CorsConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.server.validate()?;
        self.database.validate()?;
        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }
        Ok(())
    }
}

impl ServerConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("MOVIEDB_HOST").unwrap_or(defaults.host),
            port: env_or("MOVIEDB_PORT", defaults.port),
            shutdown_timeout_secs: env_or("MOVIEDB_SHUTDOWN_TIMEOUT", defaults.shutdown_timeout_secs),
            default_limit: env_or("MOVIEDB_DEFAULT_LIMIT", defaults.default_limit),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("MOVIEDB_PORT must be greater than 0");
        }
        if self.default_limit <= 0 {
            anyhow::bail!("MOVIEDB_DEFAULT_LIMIT must be greater than 0, got {}", self.default_limit);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {addr}: {e}"))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            default_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl DatabaseConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT", defaults.connect_timeout_secs),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT", defaults.idle_timeout_secs),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.url.is_empty() {
            anyhow::bail!("DATABASE_URL cannot be empty");
        }
        if self.max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be greater than 0");
        }
        if self.min_connections > self.max_connections {
            anyhow::bail!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                self.min_connections,
                self.max_connections
            );
        }
        Ok(())
    }

    /// Pool settings; connect with `.connect(&config.url)`
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
        }
    }
}

impl CorsConfig {
    fn from_env() -> Self {
        let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        Self { allowed_origins }
    }
}

/// Unset or unparsable values fall back to `default`
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
