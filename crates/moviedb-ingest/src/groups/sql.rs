// Staging DDL and finalize statements per entity group
//
// Staging tables are transaction-scoped and dropped on commit. Each load drops
// any leftover copy first so a group can run twice in one session.
// Finalize statements join staged natural keys against the lookup tables and
// insert with ON CONFLICT DO NOTHING, which makes them idempotent. Association
// statements join `movies`, dropping links to movies that were never loaded.

// ============================================================================
// Movies
// ============================================================================

pub const MOVIES_STAGING_DDL: &[&str] = &[
    "DROP TABLE IF EXISTS temp_movies",
    r#"
    CREATE TEMPORARY TABLE temp_movies (
        id                BIGINT,
        title             TEXT,
        is_adult          BOOLEAN,
        budget_usd        BIGINT,
        imdb_id           TEXT,
        original_language TEXT,
        original_title    TEXT,
        overview          TEXT,
        popularity        DOUBLE PRECISION,
        release_date      DATE,
        revenue_usd       BIGINT,
        runtime_minutes   BIGINT,
        status            TEXT,
        tagline           TEXT,
        vote_avg          DOUBLE PRECISION,
        vote_cnt          BIGINT
    ) ON COMMIT DROP
    "#,
    "DROP TABLE IF EXISTS temp_movie_genres",
    r#"
    CREATE TEMPORARY TABLE temp_movie_genres (
        movie_id BIGINT,
        genre    TEXT,
        UNIQUE (movie_id, genre)
    ) ON COMMIT DROP
    "#,
    "DROP TABLE IF EXISTS temp_movie_spoken_languages",
    r#"
    CREATE TEMPORARY TABLE temp_movie_spoken_languages (
        movie_id  BIGINT,
        iso_639_1 TEXT,
        UNIQUE (movie_id, iso_639_1)
    ) ON COMMIT DROP
    "#,
    "DROP TABLE IF EXISTS temp_movie_production_countries",
    r#"
    CREATE TEMPORARY TABLE temp_movie_production_countries (
        movie_id   BIGINT,
        iso_3166_1 TEXT,
        UNIQUE (movie_id, iso_3166_1)
    ) ON COMMIT DROP
    "#,
    "DROP TABLE IF EXISTS temp_movie_production_companies",
    r#"
    CREATE TEMPORARY TABLE temp_movie_production_companies (
        movie_id           BIGINT,
        production_company TEXT,
        UNIQUE (movie_id, production_company)
    ) ON COMMIT DROP
    "#,
];

/// Movies first: association statements join against it
pub const MOVIES_FINALIZE: &[&str] = &[
    r#"
    INSERT INTO movies (
        id, title_id, original_title_id, status_id, is_adult, budget_usd, imdb_id,
        original_language, overview, popularity, release_date, revenue_usd,
        runtime_minutes, tagline, vote_avg, vote_cnt
    )
    SELECT m.id, t.id, ot.id, s.id, m.is_adult, m.budget_usd, m.imdb_id,
           m.original_language, m.overview, m.popularity, m.release_date, m.revenue_usd,
           m.runtime_minutes, NULLIF(m.tagline, ''), m.vote_avg, m.vote_cnt
    FROM temp_movies m
    LEFT JOIN titles t ON t.title = m.title
    LEFT JOIN titles ot ON ot.title = m.original_title
    LEFT JOIN statuses s ON s.status = m.status
    ON CONFLICT DO NOTHING
    "#,
    r#"
    INSERT INTO movie_genres (movie_id, genre_id)
    SELECT m.movie_id, g.id
    FROM temp_movie_genres m
    JOIN movies mv ON mv.id = m.movie_id
    JOIN genres g ON g.genre = m.genre
    ON CONFLICT DO NOTHING
    "#,
    r#"
    INSERT INTO movie_spoken_languages (movie_id, language_id)
    SELECT m.movie_id, l.id
    FROM temp_movie_spoken_languages m
    JOIN movies mv ON mv.id = m.movie_id
    JOIN languages l ON l.iso_639_1 = m.iso_639_1
    ON CONFLICT DO NOTHING
    "#,
    r#"
    INSERT INTO movie_production_countries (movie_id, country_id)
    SELECT m.movie_id, c.id
    FROM temp_movie_production_countries m
    JOIN movies mv ON mv.id = m.movie_id
    JOIN countries c ON c.iso_3166_1 = m.iso_3166_1
    ON CONFLICT DO NOTHING
    "#,
    r#"
    INSERT INTO movie_production_companies (movie_id, production_company_id)
    SELECT m.movie_id, c.id
    FROM temp_movie_production_companies m
    JOIN movies mv ON mv.id = m.movie_id
    JOIN production_companies c ON c.production_company = m.production_company
    ON CONFLICT DO NOTHING
    "#,
];

// ============================================================================
// Credits
// ============================================================================

pub const CREDITS_STAGING_DDL: &[&str] = &[
    "DROP TABLE IF EXISTS temp_cast_members",
    r#"
    CREATE TEMPORARY TABLE temp_cast_members (
        id_in_cast     BIGINT,
        name           TEXT,
        character_name TEXT,
        gender_id      BIGINT,
        cast_id        BIGINT,
        movie_id       BIGINT,
        cast_order     BIGINT
    ) ON COMMIT DROP
    "#,
    "DROP TABLE IF EXISTS temp_crew_members",
    r#"
    CREATE TEMPORARY TABLE temp_crew_members (
        id_in_crew BIGINT,
        name       TEXT,
        job        TEXT,
        department TEXT,
        gender_id  BIGINT,
        movie_id   BIGINT
    ) ON COMMIT DROP
    "#,
];

pub const CREDITS_FINALIZE: &[&str] = &[
    r#"
    INSERT INTO cast_members (
        movie_id, id_in_cast, cast_id, name_id, character_name_id, gender_id, cast_order
    )
    SELECT c.movie_id, c.id_in_cast, c.cast_id, n.id, cn.id, g.id, c.cast_order
    FROM temp_cast_members c
    JOIN movies mv ON mv.id = c.movie_id
    LEFT JOIN names n ON n.name = c.name
    LEFT JOIN character_names cn ON cn.character_name = c.character_name
    LEFT JOIN genders g ON g.id = c.gender_id
    ON CONFLICT DO NOTHING
    "#,
    r#"
    INSERT INTO crew_members (
        movie_id, id_in_crew, name_id, job_id, department_id, gender_id
    )
    SELECT c.movie_id, c.id_in_crew, n.id, j.id, d.id, g.id
    FROM temp_crew_members c
    JOIN movies mv ON mv.id = c.movie_id
    LEFT JOIN names n ON n.name = c.name
    LEFT JOIN jobs j ON j.job = c.job
    LEFT JOIN departments d ON d.department = c.department
    LEFT JOIN genders g ON g.id = c.gender_id
    ON CONFLICT DO NOTHING
    "#,
];

// ============================================================================
// Keywords
// ============================================================================

pub const KEYWORDS_STAGING_DDL: &[&str] = &[
    "DROP TABLE IF EXISTS temp_movie_keywords",
    r#"
    CREATE TEMPORARY TABLE temp_movie_keywords (
        movie_id BIGINT,
        keyword  TEXT,
        UNIQUE (movie_id, keyword)
    ) ON COMMIT DROP
    "#,
];

pub const KEYWORDS_FINALIZE: &[&str] = &[r#"
    INSERT INTO movie_keywords (movie_id, keyword_id)
    SELECT m.movie_id, k.id
    FROM temp_movie_keywords m
    JOIN movies mv ON mv.id = m.movie_id
    JOIN keywords k ON k.keyword = m.keyword
    ON CONFLICT DO NOTHING
    "#];
