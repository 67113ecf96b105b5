//! Shared helpers for the PostgreSQL end-to-end tests
//!
//! Requires a running Docker daemon. The tests using these helpers are
//! `#[ignore]`d; run them with:
//!
//! ```bash
//! cargo test -p moviedb-ingest --test postgres -- --ignored --nocapture
//! ```

#![allow(dead_code)]

use anyhow::{Context, Result};
use moviedb_ingest::{IngestConfig, Loader};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io::Write;
use tempfile::NamedTempFile;
use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::info;

/// PostgreSQL container with the movie catalog schema applied
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container.get_host().await.context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

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

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Loader over this database with migrations applied
    pub async fn loader(&self, batch_size: usize) -> Result<Loader> {
        let config = IngestConfig {
            batch_size,
            ..IngestConfig::default()
        };
        let loader = Loader::new(self.pool.clone(), config);
        loader.migrate().await.context("Failed to run migrations")?;
        Ok(loader)
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| panic!("count({table}) failed: {e}"))
    }
}

/// CSV file with `lines` written in order
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
                .unwrap_or_else(|_| EnvFilter::new("info,moviedb_ingest=debug,sqlx=warn")),
        )
        .with_test_writer()
        .try_init();
}

pub const MOVIES_HEADER: &str = "adult,budget,genres,id,imdb_id,original_language,original_title,overview,popularity,production_companies,production_countries,release_date,revenue,runtime,spoken_languages,status,tagline,title,vote_average,vote_count";

pub const TOY_STORY: &str = r#"False,30000000,"[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}, {'id': 10751, 'name': 'Family'}]",862,tt0114709,en,Toy Story,Andy's toys come to life.,21.946943,"[{'name': 'Pixar Animation Studios', 'id': 3}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1995-10-30,373554033,81.0,"[{'iso_639_1': 'en', 'name': 'English'}]",Released,,Toy Story,7.7,5415"#;

pub const TOY_STORY_2: &str = r#"False,90000000,"[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}, {'id': 10751, 'name': 'Family'}]",863,tt0120363,en,Toy Story 2,Woody is stolen.,17.547693,"[{'name': 'Pixar Animation Studios', 'id': 3}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1999-10-30,497366869,92.0,"[{'iso_639_1': 'en', 'name': 'English'}]",Released,The toys are back!,Toy Story 2,7.3,3914"#;

pub const HEAT: &str = r#"False,60000000,"[{'id': 28, 'name': 'Action'}, {'id': 18, 'name': 'Drama'}]",949,tt0113277,en,Heat,A group of professional bank robbers.,17.924927,"[{'name': 'Warner Bros.', 'id': 6194}]","[{'iso_3166_1': 'US', 'name': 'United States of America'}]",1995-12-15,187436818,170.0,"[{'iso_639_1': 'en', 'name': 'English'}, {'iso_639_1': 'es', 'name': 'Español'}]",Released,A Los Angeles Crime Saga,Heat,7.7,1886"#;

pub const CREDITS_HEADER: &str = "cast,crew,id";

pub const TOY_STORY_CREDITS: &str = r#""[{'cast_id': 14, 'character': 'Woody (voice)', 'gender': 2, 'id': 31, 'name': 'Tom Hanks', 'order': 0}, {'cast_id': 15, 'character': 'Buzz Lightyear (voice)', 'gender': 2, 'id': 12898, 'name': 'Tim Allen', 'order': 1}]","[{'department': 'Directing', 'gender': 2, 'id': 7879, 'job': 'Director', 'name': 'John Lasseter'}]",862"#;

pub const TOY_STORY_2_CREDITS: &str = r#""[{'cast_id': 1, 'character': 'Woody (voice)', 'gender': 2, 'id': 31, 'name': 'Tom Hanks', 'order': 0}]","[{'department': 'Directing', 'gender': 2, 'id': 7879, 'job': 'Director', 'name': 'John Lasseter'}]",863"#;

/// Credits for a movie that is never loaded
pub const ORPHAN_CREDITS: &str = r#""[{'cast_id': 1, 'character': 'Nobody', 'gender': 0, 'id': 99, 'name': 'Unseen Actor', 'order': 0}]",[],424242"#;

pub const KEYWORDS_HEADER: &str = "id,keywords";

pub const TOY_STORY_KEYWORDS: &str = r#"862,"[{'id': 931, 'name': 'jealousy'}, {'id': 4290, 'name': 'toy'}]""#;
