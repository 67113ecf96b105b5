// Normalized catalog schema names
//
// Shared by the ingest engine (write side) and the query service (read side)
// so both agree on table, view and natural-key column names. The DDL itself
// lives in the workspace `migrations/` directory.

// Lookup tables keyed by natural value
pub const TITLES_TABLE: &str = "titles";
pub const TITLE_COLUMN: &str = "title";
pub const STATUSES_TABLE: &str = "statuses";
pub const STATUS_COLUMN: &str = "status";
pub const NAMES_TABLE: &str = "names";
pub const NAME_COLUMN: &str = "name";
pub const CHARACTERS_TABLE: &str = "character_names";
pub const CHARACTER_COLUMN: &str = "character_name";
pub const DEPARTMENTS_TABLE: &str = "departments";
pub const DEPARTMENT_COLUMN: &str = "department";
pub const JOBS_TABLE: &str = "jobs";
pub const JOB_COLUMN: &str = "job";
pub const GENDERS_TABLE: &str = "genders";
pub const GENDER_COLUMN: &str = "gender";

// Attribute tables carrying their own identifiers
pub const GENRES_TABLE: &str = "genres";
pub const GENRE_COLUMN: &str = "genre";
pub const LANGUAGES_TABLE: &str = "languages";
pub const COUNTRIES_TABLE: &str = "countries";
pub const PRODUCTION_COMPANIES_TABLE: &str = "production_companies";
pub const KEYWORDS_TABLE: &str = "keywords";

// Entities and associations
pub const MOVIES_TABLE: &str = "movies";
pub const MOVIE_GENRES_TABLE: &str = "movie_genres";
pub const MOVIE_SPOKEN_LANGUAGES_TABLE: &str = "movie_spoken_languages";
pub const MOVIE_PRODUCTION_COUNTRIES_TABLE: &str = "movie_production_countries";
pub const MOVIE_PRODUCTION_COMPANIES_TABLE: &str = "movie_production_companies";
pub const MOVIE_KEYWORDS_TABLE: &str = "movie_keywords";
pub const CAST_TABLE: &str = "cast_members";
pub const CREW_TABLE: &str = "crew_members";

// Read-side views
pub const MOVIES_VIEW: &str = "v_movies";
pub const CAST_VIEW: &str = "v_cast";
pub const CREW_VIEW: &str = "v_crew";

/// Name of the run-scoped staging table for a permanent table
pub fn staging_table(table: &str) -> String {
    format!("temp_{}", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_table_name() {
        assert_eq!(staging_table(MOVIE_GENRES_TABLE), "temp_movie_genres");
    }
}
