//! Movies resembling a given movie
//!
//! A candidate shares at least one genre, cast name or crew name with the
//! requested movie. Its score is
//! `5 * same_original_language + 3 * shared_genres + 2 * shared_cast + shared_crew`;
//! ties break on vote average.

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;

const LOOKALIKE_SQL: &str = r#"
WITH requested AS (
    SELECT m.id, m.original_language, t.title
    FROM movies m
    LEFT JOIN titles t ON t.id = m.title_id
    WHERE m.id = $1
),
same_genres AS (
    SELECT other.movie_id, COUNT(*) AS cnt
    FROM movie_genres mine
    JOIN movie_genres other
      ON other.genre_id = mine.genre_id AND other.movie_id <> mine.movie_id
    WHERE mine.movie_id = $1
    GROUP BY other.movie_id
),
same_cast AS (
    SELECT other.movie_id, COUNT(*) AS cnt
    FROM cast_members mine
    JOIN cast_members other
      ON other.name_id = mine.name_id AND other.movie_id <> mine.movie_id
    WHERE mine.movie_id = $1
    GROUP BY other.movie_id
),
same_crew AS (
    SELECT other.movie_id, COUNT(*) AS cnt
    FROM crew_members mine
    JOIN crew_members other
      ON other.name_id = mine.name_id AND other.movie_id <> mine.movie_id
    WHERE mine.movie_id = $1
    GROUP BY other.movie_id
)
SELECT r.id                        AS requested_movie_id,
       r.title                     AS requested_movie,
       m.id                        AS movie_id,
       t.title                     AS title,
       m.original_language,
       COALESCE(sg.cnt, 0)         AS mutual_genres_amt,
       COALESCE(sc.cnt, 0)         AS mutual_cast_amt,
       COALESCE(scr.cnt, 0)        AS mutual_crew_amt,
       m.vote_avg,
       (CASE WHEN m.original_language = r.original_language THEN 5 ELSE 0 END
        + 3 * COALESCE(sg.cnt, 0)
        + 2 * COALESCE(sc.cnt, 0)
        + COALESCE(scr.cnt, 0))::BIGINT AS lookalike_score
FROM requested r
JOIN movies m ON m.id <> r.id
LEFT JOIN same_genres sg ON sg.movie_id = m.id
LEFT JOIN same_cast sc ON sc.movie_id = m.id
LEFT JOIN same_crew scr ON scr.movie_id = m.id
LEFT JOIN titles t ON t.id = m.title_id
WHERE sg.movie_id IS NOT NULL OR sc.movie_id IS NOT NULL OR scr.movie_id IS NOT NULL
ORDER BY lookalike_score DESC, m.vote_avg DESC NULLS LAST, m.id
LIMIT $2
"#;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Lookalike {
    pub movie_id: i64,
    pub title: Option<String>,
    pub original_language: Option<String>,
    pub mutual_genres_amt: i64,
    pub mutual_cast_amt: i64,
    pub mutual_crew_amt: i64,
    pub vote_avg: Option<f64>,
    pub lookalike_score: i64,
}

#[derive(Debug, FromRow)]
struct LookalikeRow {
    requested_movie_id: i64,
    requested_movie: Option<String>,
    #[sqlx(flatten)]
    lookalike: Lookalike,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookalikes {
    pub movie_id: i64,
    pub movie_name: Option<String>,
    pub lookalikes: Vec<Lookalike>,
}

impl Lookalikes {
    fn from_rows(rows: Vec<LookalikeRow>) -> Option<Self> {
        let first = rows.first()?;
        let (movie_id, movie_name) = (first.requested_movie_id, first.requested_movie.clone());
        Some(Self {
            movie_id,
            movie_name,
            lookalikes: rows.into_iter().map(|row| row.lookalike).collect(),
        })
    }
}

/// `None` when the movie is unknown or nothing resembles it
pub async fn find_lookalikes(pool: &PgPool, movie_id: i64, limit: i64) -> AppResult<Option<Lookalikes>> {
    let rows: Vec<LookalikeRow> = sqlx::query_as(LOOKALIKE_SQL)
        .bind(movie_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    tracing::debug!(movie_id, found = rows.len(), "Lookalike search");
    Ok(Lookalikes::from_rows(rows))
}
