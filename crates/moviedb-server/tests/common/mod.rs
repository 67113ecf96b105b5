//! Shared helpers for the server tests

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use moviedb_ingest::{IngestConfig, Loader};
use moviedb_server::catalog::{ColumnAllowList, View};
use moviedb_server::{routes, AppState};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tower::ServiceExt;

/// Router over a pool that never reaches a database
pub fn offline_router() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy("postgresql://postgres@127.0.0.1:1/unreachable")
        .unwrap();
    let columns = ColumnAllowList::preloaded([
        (View::Movies, vec!["id", "title", "release_date"]),
        (View::Cast, vec!["movie_id", "name", "character_name"]),
        (View::Crew, vec!["movie_id", "name", "job"]),
    ]);
    routes::router(AppState::new(pool, 1000).with_columns(columns))
}

/// Status and JSON body (Null when empty)
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// PostgreSQL container with the catalog schema applied
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432.tcp()).await?;
        let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self {
            _container: container,
            pool,
        })
    }

    /// Load the fixture movies and credits through the ingest loader
    pub async fn seed(&self) -> Result<()> {
        let loader = Loader::new(self.pool.clone(), IngestConfig::default());
        loader.migrate().await?;

        let movies = csv_file(&[MOVIES_HEADER, TOY_STORY, TOY_STORY_2, HEAT]);
        let credits = csv_file(&[CREDITS_HEADER, TOY_STORY_CREDITS, TOY_STORY_2_CREDITS, HEAT_CREDITS]);
        loader.load_movies_file(movies.path(), None).await?;
        loader.load_credits_file(credits.path(), None).await?;
        Ok(())
    }

    pub fn router(&self) -> Router {
        routes::router(AppState::new(self.pool.clone(), 1000))
    }
}

pub fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,moviedb_server=debug,sqlx=warn")),
        )
        .with_test_writer()
        .try_init();
}

pub const MOVIES_HEADER: &str = "adult,budget,genres,id,imdb_id,original_language,original_title,overview,popularity,production_companies,production_countries,release_date,revenue,runtime,spoken_languages,status,tagline,title,vote_average,vote_count";

pub const TOY_STORY: &str = r#"False,30000000,"[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}, {'id': 10751, 'name': 'Family'}]",862,tt0114709,en,Toy Story,Andy's toys come to life.,21.946943,"[{'name': 'Pixar Animation Studios', 'id': 3}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1995-10-30,373554033,81.0,"[{'iso_639_1': 'en', 'name': 'English'}]",Released,,Toy Story,7.7,5415"#;

pub const TOY_STORY_2: &str = r#"False,90000000,"[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}, {'id': 10751, 'name': 'Family'}]",863,tt0120363,en,Toy Story 2,Woody is stolen.,17.547693,"[{'name': 'Pixar Animation Studios', 'id': 3}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1999-10-30,497366869,92.0,"[{'iso_639_1': 'en', 'name': 'English'}]",Released,The toys are back!,Toy Story 2,7.3,3914"#;

pub const HEAT: &str = r#"False,60000000,"[{'id': 28, 'name': 'Action'}, {'id': 18, 'name': 'Drama'}]",949,tt0113277,en,Heat,A group of professional bank robbers.,17.924927,"[{'name': 'Warner Bros.', 'id': 6194}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1995-12-15,187436818,170.0,"[{'iso_639_1': 'en', 'name': 'English'}]",Released,A Los Angeles Crime Saga,Heat,7.7,1886"#;

pub const CREDITS_HEADER: &str = "cast,crew,id";

pub const TOY_STORY_CREDITS: &str = r#""[{'cast_id': 14, 'character': 'Woody (voice)', 'gender': 2, 'id': 31, 'name': 'Tom Hanks', 'order': 0}, {'cast_id': 15, 'character': 'Buzz Lightyear (voice)', 'gender': 2, 'id': 12898, 'name': 'Tim Allen', 'order': 1}]","[{'department': 'Directing', 'gender': 2, 'id': 7879, 'job': 'Director', 'name': 'John Lasseter'}]",862"#;

pub const TOY_STORY_2_CREDITS: &str = r#""[{'cast_id': 1, 'character': 'Woody (voice)', 'gender': 2, 'id': 31, 'name': 'Tom Hanks', 'order': 0}]","[{'department': 'Directing', 'gender': 2, 'id': 7879, 'job': 'Director', 'name': 'John Lasseter'}]",863"#;

pub const HEAT_CREDITS: &str = r#""[{'cast_id': 1, 'character': 'Lt. Vincent Hanna', 'gender': 2, 'id': 1158, 'name': 'Al Pacino', 'order': 0}, {'cast_id': 25, 'character': 'Vincent Hanna (narration)', 'gender': 2, 'id': 1158, 'name': 'Al Pacino', 'order': 9}, {'cast_id': 3, 'character': 'Charlene Shiherlis', 'gender': 1, 'id': 6384, 'name': 'Ashley Judd', 'order': 2}]","[{'department': 'Writing', 'gender': 2, 'id': 638, 'job': 'Screenplay', 'name': 'Michael Mann'}]",949"#;
