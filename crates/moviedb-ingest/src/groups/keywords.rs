// Keywords group

use async_trait::async_trait;
use moviedb_common::schema::{staging_table, KEYWORDS_TABLE, MOVIE_KEYWORDS_TABLE};

use super::sql;
use crate::config::IngestConfig;
use crate::engine::{BatchWriter, EntityGroup, Store};
use crate::error::Result;
use crate::models::{Keyword, Keywords, MovieKeyword};

pub struct KeywordsGroup {
    keywords: BatchWriter<Keyword, i64>,
    movie_keywords: BatchWriter<MovieKeyword>,
}

impl KeywordsGroup {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        Ok(Self {
            keywords: BatchWriter::with_cache(
                KEYWORDS_TABLE,
                config.batch_size,
                config.caches.keywords,
                |k: &Keyword| k.id,
            )?,
            movie_keywords: BatchWriter::new(
                staging_table(MOVIE_KEYWORDS_TABLE),
                config.batch_size,
            )?,
        })
    }
}

#[async_trait]
impl EntityGroup for KeywordsGroup {
    type Entity = Keywords;

    fn name(&self) -> &'static str {
        "keywords"
    }

    fn staging_ddl(&self) -> &'static [&'static str] {
        sql::KEYWORDS_STAGING_DDL
    }

    async fn stage<S: Store>(&mut self, entity: Keywords, store: &mut S) -> Result<()> {
        let movie_id = entity.movie_id;
        let keywords: Vec<Keyword> = entity
            .keywords
            .into_iter()
            .filter(|k| !k.name.is_empty())
            .collect();

        let links: Vec<MovieKeyword> = keywords
            .iter()
            .map(|k| MovieKeyword::new(movie_id, &k.name))
            .collect();

        self.keywords.extend(Some(keywords), store).await?;
        self.movie_keywords.extend(Some(links), store).await?;
        Ok(())
    }

    async fn flush_all<S: Store>(&mut self, store: &mut S) -> Result<()> {
        self.keywords.flush(store).await?;
        self.movie_keywords.flush(store).await?;
        Ok(())
    }

    fn finalize_statements(&self) -> &'static [&'static str] {
        sql::KEYWORDS_FINALIZE
    }
}
