// Ingest error taxonomy

use crate::engine::LoadState;

/// Result type for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error types for staged ingestion
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A record type declared an unusable field contract. Programming error.
    #[error("Contract violation in {record}: {message}")]
    ContractViolation {
        record: &'static str,
        message: String,
    },

    /// The store rejected a batched write
    #[error("Write to {target} failed: {message}")]
    Write { target: String, message: String },

    /// The store rejected a staging or finalize statement
    #[error("Statement failed: {message}")]
    Statement { message: String },

    #[error("Invalid load transition: {from} -> {to}")]
    InvalidTransition { from: LoadState, to: LoadState },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Literal parse error at byte {offset}: {message}")]
    Literal { offset: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub fn contract(record: &'static str, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            record,
            message: message.into(),
        }
    }

    pub fn write(target: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Write {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error came from the store rather than the source or the code
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Write { .. } | Self::Statement { .. } | Self::Database(_)
        )
    }
}
