//! Aggregate reports over the loaded catalog
//!
//! Request values are always bound. Values that name a lookup entry (a gender,
//! a genre, a job) are checked against the lookup table first, so a typo is
//! reported instead of silently matching nothing.

use moviedb_common::schema::{
    GENDERS_TABLE, GENDER_COLUMN, GENRES_TABLE, GENRE_COLUMN, JOBS_TABLE, JOB_COLUMN,
};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::query::{parse_limit, LIMIT_PARAM};
use crate::error::AppResult;

pub const JOB_PARAM: &str = "job";

/// Lookup tables a request may name values from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Gender,
    Genre,
    Job,
}

impl Lookup {
    fn table_and_column(self) -> (&'static str, &'static str) {
        match self {
            Lookup::Gender => (GENDERS_TABLE, GENDER_COLUMN),
            Lookup::Genre => (GENRES_TABLE, GENRE_COLUMN),
            Lookup::Job => (JOBS_TABLE, JOB_COLUMN),
        }
    }

    /// Every value, in id order
    pub async fn values(self, pool: &PgPool) -> AppResult<Vec<String>> {
        let (table, column) = self.table_and_column();
        let sql = format!("SELECT {column} FROM {table} ORDER BY id");
        Ok(sqlx::query_scalar(&sql).fetch_all(pool).await?)
    }

    /// Requested values missing from the table, sorted and deduplicated
    pub async fn unknown(self, pool: &PgPool, requested: &[String]) -> AppResult<Vec<String>> {
        if requested.is_empty() {
            return Ok(Vec::new());
        }
        let (table, column) = self.table_and_column();
        let sql = format!(
            "SELECT DISTINCT v FROM unnest($1::text[]) AS v \
             WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {column} = v) ORDER BY v"
        );
        Ok(sqlx::query_scalar(&sql)
            .bind(requested.to_vec())
            .fetch_all(pool)
            .await?)
    }
}

// ============================================================================
// Actors with several roles in one movie
// ============================================================================

const MULTI_ROLE_SQL: &str = r#"
SELECT c.movie_id,
       t.title,
       n.name,
       g.gender,
       COUNT(DISTINCT c.character_name_id) AS roles,
       array_remove(array_agg(DISTINCT cn.character_name ORDER BY cn.character_name), NULL) AS characters
FROM cast_members c
JOIN names n ON n.id = c.name_id
JOIN movies m ON m.id = c.movie_id
LEFT JOIN titles t ON t.id = m.title_id
LEFT JOIN character_names cn ON cn.id = c.character_name_id
LEFT JOIN genders g ON g.id = c.gender_id
WHERE $1::text IS NULL OR g.gender = $1
GROUP BY c.movie_id, t.title, n.id, n.name, g.gender
HAVING COUNT(DISTINCT c.character_name_id) > 1
ORDER BY roles DESC, c.movie_id, n.name
LIMIT $2
"#;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MultiRoleActor {
    pub movie_id: i64,
    pub title: Option<String>,
    pub name: String,
    pub gender: Option<String>,
    pub roles: i64,
    pub characters: Vec<String>,
}

pub async fn multi_role_actors(
    pool: &PgPool,
    gender: Option<&str>,
    limit: i64,
) -> AppResult<Vec<MultiRoleActor>> {
    Ok(sqlx::query_as(MULTI_ROLE_SQL)
        .bind(gender)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

// ============================================================================
// Net revenue per credited worker
// ============================================================================

const PROFIT_PER_WORKER_SQL: &str = r#"
WITH workers AS (
    SELECT movie_id, COUNT(*) AS cnt
    FROM (
        SELECT movie_id FROM cast_members
        UNION ALL
        SELECT movie_id FROM crew_members
    ) credited
    GROUP BY movie_id
)
SELECT m.id AS movie_id,
       t.title,
       m.budget_usd,
       m.revenue_usd,
       w.cnt AS workers,
       (m.revenue_usd - m.budget_usd)::DOUBLE PRECISION / w.cnt AS profit_per_worker
FROM genres gn
JOIN movie_genres mg ON mg.genre_id = gn.id
JOIN movies m ON m.id = mg.movie_id
JOIN workers w ON w.movie_id = m.id
LEFT JOIN titles t ON t.id = m.title_id
WHERE gn.genre = $1
  AND m.budget_usd IS NOT NULL
  AND m.revenue_usd IS NOT NULL
ORDER BY profit_per_worker DESC, m.id
LIMIT $2
"#;

/// A movie's `(revenue - budget) / (cast + crew)`
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ProfitPerWorker {
    pub movie_id: i64,
    pub title: Option<String>,
    pub budget_usd: i64,
    pub revenue_usd: i64,
    pub workers: i64,
    pub profit_per_worker: f64,
}

/// Movies of `genre` with known budget, revenue and credits, best first
pub async fn best_profit_per_worker(pool: &PgPool, genre: &str, limit: i64) -> AppResult<Vec<ProfitPerWorker>> {
    Ok(sqlx::query_as(PROFIT_PER_WORKER_SQL)
        .bind(genre)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

// ============================================================================
// Crew who only ever worked with one production company
// ============================================================================

const LOYAL_CREW_SQL: &str = r#"
SELECT n.name,
       MIN(pc.production_company) AS production_company,
       array_agg(DISTINCT j.job ORDER BY j.job) AS jobs,
       COUNT(DISTINCT c.movie_id) AS movies
FROM crew_members c
JOIN names n ON n.id = c.name_id
JOIN jobs j ON j.id = c.job_id
JOIN movie_production_companies mpc ON mpc.movie_id = c.movie_id
JOIN production_companies pc ON pc.id = mpc.production_company_id
WHERE cardinality($1::text[]) = 0 OR j.job = ANY($1)
GROUP BY n.id, n.name
HAVING COUNT(DISTINCT mpc.production_company_id) = 1
ORDER BY movies DESC, n.name
LIMIT $2
"#;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct LoyalCrewMember {
    pub name: String,
    pub production_company: String,
    pub jobs: Vec<String>,
    pub movies: i64,
}

/// `job` (repeatable) and `limit` from a query string; other keys are ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoyalCrewQuery {
    /// Empty searches every job
    pub jobs: Vec<String>,
    pub limit: i64,
}

impl LoyalCrewQuery {
    pub fn from_params(params: Vec<(String, String)>, default_limit: i64) -> AppResult<Self> {
        let mut jobs = Vec::new();
        let mut limit = None;
        for (key, value) in params {
            match key.as_str() {
                JOB_PARAM if !jobs.contains(&value) => jobs.push(value),
                LIMIT_PARAM => {
                    limit.get_or_insert(value);
                },
                _ => {},
            }
        }
        Ok(Self {
            jobs,
            limit: parse_limit(limit.as_deref(), default_limit)?,
        })
    }
}

pub async fn loyal_crew_members(pool: &PgPool, query: &LoyalCrewQuery) -> AppResult<Vec<LoyalCrewMember>> {
    Ok(sqlx::query_as(LOYAL_CREW_SQL)
        .bind(query.jobs.clone())
        .bind(query.limit)
        .fetch_all(pool)
        .await?)
}

// ============================================================================
// Genres of movies matching a text search
// ============================================================================

const GENRE_DISTRIBUTION_SQL: &str = r#"
WITH matched AS (
    SELECT m.id
    FROM movies m
    LEFT JOIN titles t ON t.id = m.title_id
    WHERE to_tsvector('english', concat_ws(' ', t.title, m.overview, m.tagline))
          @@ websearch_to_tsquery('english', $1)
)
SELECT gn.genre,
       COUNT(*) AS movies,
       (COUNT(*)::DOUBLE PRECISION / (SELECT COUNT(*) FROM matched)) AS share
FROM matched mt
JOIN movie_genres mg ON mg.movie_id = mt.id
JOIN genres gn ON gn.id = mg.genre_id
GROUP BY gn.genre
ORDER BY movies DESC, gn.genre
"#;

/// Share of matched movies carrying `genre`; a movie counts once per genre
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GenreShare {
    pub genre: String,
    pub movies: i64,
    pub share: f64,
}

/// `search` uses web-search syntax over title, overview and tagline:
/// quoted phrases, `or`, and `-` to exclude a word
pub async fn genre_distribution(pool: &PgPool, search: &str) -> AppResult<Vec<GenreShare>> {
    let shares: Vec<GenreShare> = sqlx::query_as(GENRE_DISTRIBUTION_SQL)
        .bind(search)
        .fetch_all(pool)
        .await?;
    tracing::debug!(search, genres = shares.len(), "Genre distribution");
    Ok(shares)
}
