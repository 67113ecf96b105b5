// Load entry points
//
// Every entry point takes an optional session. With a session the caller owns
// the transaction and commits it; without one the loader begins a transaction,
// runs the load and commits only if the load reached DONE. A failed load's
// transaction is dropped, which rolls it back.

use futures::stream::{self, Stream};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use tracing::info;

use crate::config::IngestConfig;
use crate::engine::{EntityGroup, LoadReport, PgStore, StagedLoad, Store};
use crate::error::Result;
use crate::groups::{CreditsGroup, KeywordsGroup, MoviesGroup};
use crate::sources::{kaggle, TmdbClient};

pub struct Loader {
    pool: PgPool,
    config: IngestConfig,
}

impl Loader {
    /// Validate `config` and open a connection pool
    pub async fn connect(config: IngestConfig) -> Result<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        info!(max_connections = config.max_connections, "Connected to database");
        Ok(Self::new(pool, config))
    }

    pub fn new(pool: PgPool, config: IngestConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Migrations applied");
        Ok(())
    }

    /// Begin a session to share between several loads
    pub async fn begin(&self) -> Result<PgStore> {
        PgStore::begin(&self.pool).await
    }

    // ========================================================================
    // Kaggle
    // ========================================================================

    pub async fn load_movies_file(
        &self,
        path: impl AsRef<Path>,
        session: Option<&mut PgStore>,
    ) -> Result<LoadReport> {
        let mut group = MoviesGroup::new(&self.config)?;
        let movies = kaggle::movies(path)?;
        self.run(&mut group, stream::iter(movies), session).await
    }

    pub async fn load_credits_file(
        &self,
        path: impl AsRef<Path>,
        session: Option<&mut PgStore>,
    ) -> Result<LoadReport> {
        let mut group = CreditsGroup::new(&self.config)?;
        let credits = kaggle::credits(path)?;
        self.run(&mut group, stream::iter(credits), session).await
    }

    pub async fn load_keywords_file(
        &self,
        path: impl AsRef<Path>,
        session: Option<&mut PgStore>,
    ) -> Result<LoadReport> {
        let mut group = KeywordsGroup::new(&self.config)?;
        let keywords = kaggle::keywords(path)?;
        self.run(&mut group, stream::iter(keywords), session).await
    }

    /// Movies, credits, then keywords from one dataset directory, each group
    /// in its own transaction
    pub async fn load_kaggle(&self, dir: impl AsRef<Path>) -> Result<Vec<LoadReport>> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "Loading Kaggle dataset");

        Ok(vec![
            self.load_movies_file(dir.join(kaggle::MOVIES_FILE), None).await?,
            self.load_credits_file(dir.join(kaggle::CREDITS_FILE), None).await?,
            self.load_keywords_file(dir.join(kaggle::KEYWORDS_FILE), None).await?,
        ])
    }

    // ========================================================================
    // TMDB
    // ========================================================================

    /// Now-playing movies with their credits and keywords, in one transaction
    pub async fn load_tmdb(
        &self,
        client: &TmdbClient,
        session: Option<&mut PgStore>,
    ) -> Result<Vec<LoadReport>> {
        match session {
            Some(store) => self.tmdb_groups(client, store).await,
            None => {
                let mut store = self.begin().await?;
                let reports = self.tmdb_groups(client, &mut store).await?;
                store.commit().await?;
                info!(groups = reports.len(), "Committed TMDB load");
                Ok(reports)
            },
        }
    }

    async fn tmdb_groups(&self, client: &TmdbClient, store: &mut PgStore) -> Result<Vec<LoadReport>> {
        let mut movies = MoviesGroup::new(&self.config)?;
        let movies_report = self.stage(&mut movies, client.movies(), store).await?;
        let ids = movies.into_movie_ids();

        let mut credits = CreditsGroup::new(&self.config)?;
        let credits_report = self.stage(&mut credits, client.credits(&ids), store).await?;

        let mut keywords = KeywordsGroup::new(&self.config)?;
        let keywords_report = self.stage(&mut keywords, client.keywords(&ids), store).await?;

        Ok(vec![movies_report, credits_report, keywords_report])
    }

    // ========================================================================
    // Shared
    // ========================================================================

    async fn run<G, E>(
        &self,
        group: &mut G,
        entities: E,
        session: Option<&mut PgStore>,
    ) -> Result<LoadReport>
    where
        G: EntityGroup,
        E: Stream<Item = Result<G::Entity>>,
    {
        match session {
            Some(store) => self.stage(group, entities, store).await,
            None => {
                let mut store = self.begin().await?;
                let report = self.stage(group, entities, &mut store).await?;
                store.commit().await?;
                info!(group = report.group, "Committed load");
                Ok(report)
            },
        }
    }

    async fn stage<G, E, S>(&self, group: &mut G, entities: E, store: &mut S) -> Result<LoadReport>
    where
        G: EntityGroup,
        E: Stream<Item = Result<G::Entity>>,
        S: Store,
    {
        StagedLoad::new(store)
            .with_progress_every(self.config.progress_every)
            .run(group, entities)
            .await
    }
}
