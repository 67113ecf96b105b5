//! Movie catalog ingestion
//!
//! Loads movie metadata from the Kaggle "The Movies Dataset" CSV export or the
//! live TMDB API into a normalized PostgreSQL schema.
//!
//! # Architecture
//!
//! - [`engine`]: the reusable staging machinery. Records declare a field
//!   contract, batched writers buffer and dedup them, and a staged load moves
//!   one entity group through CREATED → STAGING → FLUSHING → FINALIZING → DONE
//!   inside a caller-owned transaction.
//! - [`groups`]: the movie catalog's entity groups (movies, credits, keywords)
//!   with their staging tables and finalize SQL.
//! - [`sources`]: extractors producing entities from files or HTTP.
//! - [`loader`]: pool, migrations and one entry point per group per source.
//!
//! Staged rows carry natural keys only (names, ISO codes). Surrogate ids are
//! resolved by the finalize statements, so lookups never round-trip to Rust.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod engine;
pub mod error;
pub mod groups;
pub mod loader;
pub mod models;
pub mod sources;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use loader::Loader;
