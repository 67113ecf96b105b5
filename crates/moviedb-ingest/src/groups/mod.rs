//! Entity groups of the movie catalog
//!
//! Each group owns the writers one load needs and the SQL that finalizes it:
//!
//! - [`MoviesGroup`]: movies with titles, statuses, genres, languages,
//!   countries, companies and their associations
//! - [`CreditsGroup`]: cast and crew with names, characters, jobs, departments
//! - [`KeywordsGroup`]: keywords and movie keyword links

pub mod credits;
pub mod keywords;
pub mod movies;
pub mod sql;

pub use credits::CreditsGroup;
pub use keywords::KeywordsGroup;
pub use movies::MoviesGroup;

/// Drop attributes whose natural key is blank; `None` stays `None`
pub(crate) fn with_keys<T>(items: Option<Vec<T>>, key: fn(&T) -> &str) -> Option<Vec<T>> {
    items.map(|items| items.into_iter().filter(|item| !key(item).is_empty()).collect())
}
