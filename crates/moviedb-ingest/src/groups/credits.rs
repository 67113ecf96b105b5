// Credits group: cast and crew

use async_trait::async_trait;
use moviedb_common::schema::{
    staging_table, CAST_TABLE, CHARACTERS_TABLE, CHARACTER_COLUMN, CREW_TABLE, DEPARTMENTS_TABLE,
    DEPARTMENT_COLUMN, JOBS_TABLE, JOB_COLUMN, NAMES_TABLE, NAME_COLUMN,
};

use super::sql;
use crate::config::IngestConfig;
use crate::engine::{BatchWriter, EntityGroup, Store, ValueWriter};
use crate::error::Result;
use crate::models::{CastMember, Credits, CrewMember};

pub struct CreditsGroup {
    cast: BatchWriter<CastMember>,
    crew: BatchWriter<CrewMember>,
    names: ValueWriter,
    characters: ValueWriter,
    departments: ValueWriter,
    jobs: ValueWriter,
}

impl CreditsGroup {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let batch = config.batch_size;
        let capacity = config.caches.values;

        Ok(Self {
            cast: BatchWriter::new(staging_table(CAST_TABLE), batch)?,
            crew: BatchWriter::new(staging_table(CREW_TABLE), batch)?,
            names: ValueWriter::new(NAMES_TABLE, NAME_COLUMN, batch, capacity)?,
            characters: ValueWriter::new(CHARACTERS_TABLE, CHARACTER_COLUMN, batch, capacity)?,
            departments: ValueWriter::new(DEPARTMENTS_TABLE, DEPARTMENT_COLUMN, batch, capacity)?,
            jobs: ValueWriter::new(JOBS_TABLE, JOB_COLUMN, batch, capacity)?,
        })
    }
}

#[async_trait]
impl EntityGroup for CreditsGroup {
    type Entity = Credits;

    fn name(&self) -> &'static str {
        "credits"
    }

    fn staging_ddl(&self) -> &'static [&'static str] {
        sql::CREDITS_STAGING_DDL
    }

    async fn stage<S: Store>(&mut self, credits: Credits, store: &mut S) -> Result<()> {
        for member in credits.cast {
            self.names.append(Some(member.name.as_str()), store).await?;
            self.characters.append(member.character.as_deref(), store).await?;
            self.cast.append(member, store).await?;
        }

        for member in credits.crew {
            self.names.append(Some(member.name.as_str()), store).await?;
            self.jobs.append(member.job.as_deref(), store).await?;
            self.departments.append(member.department.as_deref(), store).await?;
            self.crew.append(member, store).await?;
        }

        Ok(())
    }

    async fn flush_all<S: Store>(&mut self, store: &mut S) -> Result<()> {
        self.names.flush(store).await?;
        self.characters.flush(store).await?;
        self.departments.flush(store).await?;
        self.jobs.flush(store).await?;
        self.cast.flush(store).await?;
        self.crew.flush(store).await?;
        Ok(())
    }

    fn finalize_statements(&self) -> &'static [&'static str] {
        sql::CREDITS_FINALIZE
    }
}
