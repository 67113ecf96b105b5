//! Extractors feeding the entity groups
//!
//! - [`kaggle`]: the three CSV files of the Kaggle dataset
//! - [`tmdb`]: the live TMDB API
//! - [`pyliteral`]: decoder for the literal columns of the CSV files

pub mod kaggle;
pub mod pyliteral;
pub mod tmdb;

pub use tmdb::TmdbClient;
