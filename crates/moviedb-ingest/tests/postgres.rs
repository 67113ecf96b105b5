//! End-to-end loads into a disposable PostgreSQL
//!
//! Requires Docker:
//!
//! ```bash
//! cargo test -p moviedb-ingest --test postgres -- --ignored --nocapture
//! ```

mod common;

use common::*;
use moviedb_ingest::engine::{LoadState, StagedLoad, Store};
use moviedb_ingest::groups::MoviesGroup;
use moviedb_ingest::models::Movie;

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_movies_file_normalizes_attributes() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let loader = pg.loader(2).await.unwrap();

    let file = csv_file(&[MOVIES_HEADER, TOY_STORY, TOY_STORY_2, HEAT]);
    let report = loader.load_movies_file(file.path(), None).await.unwrap();

    assert_eq!(report.entities, 3);
    assert_eq!(pg.count("movies").await, 3);
    assert_eq!(pg.count("genres").await, 5);
    assert_eq!(pg.count("movie_genres").await, 8);
    assert_eq!(pg.count("production_companies").await, 2);
    assert_eq!(pg.count("movie_spoken_languages").await, 4);
    assert_eq!(pg.count("statuses").await, 1);

    let (title, status, runtime, tagline): (Option<String>, Option<String>, Option<i64>, Option<String>) =
        sqlx::query_as(
            "SELECT title, status, runtime_minutes, tagline FROM v_movies WHERE id = $1",
        )
        .bind(862_i64)
        .fetch_one(pg.pool())
        .await
        .unwrap();

    assert_eq!(title.as_deref(), Some("Toy Story"));
    assert_eq!(status.as_deref(), Some("Released"));
    assert_eq!(runtime, Some(81));
    assert_eq!(tagline, None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reloading_is_idempotent() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let loader = pg.loader(100).await.unwrap();

    let movies = csv_file(&[MOVIES_HEADER, TOY_STORY, TOY_STORY_2]);
    let credits = csv_file(&[CREDITS_HEADER, TOY_STORY_CREDITS, TOY_STORY_2_CREDITS]);

    for _ in 0..2 {
        loader.load_movies_file(movies.path(), None).await.unwrap();
        loader.load_credits_file(credits.path(), None).await.unwrap();
    }

    assert_eq!(pg.count("movies").await, 2);
    assert_eq!(pg.count("titles").await, 2);
    assert_eq!(pg.count("movie_genres").await, 6);
    assert_eq!(pg.count("names").await, 3);
    assert_eq!(pg.count("cast_members").await, 3);
    assert_eq!(pg.count("crew_members").await, 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_credits_of_unknown_movies_are_dropped() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let loader = pg.loader(100).await.unwrap();

    let movies = csv_file(&[MOVIES_HEADER, TOY_STORY]);
    let credits = csv_file(&[CREDITS_HEADER, TOY_STORY_CREDITS, ORPHAN_CREDITS]);
    loader.load_movies_file(movies.path(), None).await.unwrap();
    loader.load_credits_file(credits.path(), None).await.unwrap();

    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cast_members WHERE movie_id = $1")
        .bind(424242_i64)
        .fetch_one(pg.pool())
        .await
        .unwrap();
    assert_eq!(orphans, 0);
    assert_eq!(pg.count("cast_members").await, 2);

    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM v_cast WHERE movie_id = $1 ORDER BY cast_order")
        .bind(862_i64)
        .fetch_all(pg.pool())
        .await
        .unwrap();
    assert_eq!(names, vec!["Tom Hanks", "Tim Allen"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_shared_session_commits_once() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let loader = pg.loader(100).await.unwrap();

    let movies = csv_file(&[MOVIES_HEADER, TOY_STORY]);
    let keywords = csv_file(&[KEYWORDS_HEADER, TOY_STORY_KEYWORDS]);

    let mut session = loader.begin().await.unwrap();
    loader.load_movies_file(movies.path(), Some(&mut session)).await.unwrap();
    loader.load_keywords_file(keywords.path(), Some(&mut session)).await.unwrap();

    // nothing visible outside the session yet
    assert_eq!(pg.count("movies").await, 0);

    session.commit().await.unwrap();
    assert_eq!(pg.count("movies").await, 1);
    assert_eq!(pg.count("movie_keywords").await, 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_uncommitted_session_leaves_no_rows() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let loader = pg.loader(100).await.unwrap();

    let movies = csv_file(&[MOVIES_HEADER, TOY_STORY]);
    {
        let mut session = loader.begin().await.unwrap();
        loader.load_movies_file(movies.path(), Some(&mut session)).await.unwrap();
    }

    assert_eq!(pg.count("movies").await, 0);
    assert_eq!(pg.count("titles").await, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_leftover_staging_table_is_replaced() {
    init_test_tracing();
    let pg = TestPostgres::start().await.unwrap();
    let loader = pg.loader(100).await.unwrap();

    let mut session = loader.begin().await.unwrap();
    session
        .execute("CREATE TEMPORARY TABLE temp_movies (id BIGINT) ON COMMIT DROP", &[])
        .await
        .unwrap();

    let movie = Movie {
        id: 1,
        title: Some("Heat".to_string()),
        ..Movie::default()
    };
    let mut group = MoviesGroup::new(loader.config()).unwrap();
    let mut load = StagedLoad::new(&mut session);
    load.run(&mut group, futures::stream::iter(vec![Ok(movie)]))
        .await
        .unwrap();
    assert_eq!(load.state(), LoadState::Done);

    session.commit().await.unwrap();
    assert_eq!(pg.count("movies").await, 1);
}
