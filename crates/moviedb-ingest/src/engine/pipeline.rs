// Staging-and-finalize load protocol
//
// One load walks CREATED -> STAGING -> FLUSHING -> FINALIZING -> DONE.
// Any error moves it to FAILED. The load never commits; its caller does.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::engine::Store;
use crate::error::{IngestError, Result};

/// Default cadence of progress messages, in entities
pub const DEFAULT_PROGRESS_EVERY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Created,
    Staging,
    Flushing,
    Finalizing,
    Done,
    Failed,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Done | LoadState::Failed)
    }

    pub fn can_advance_to(self, next: LoadState) -> bool {
        use LoadState::*;
        match (self, next) {
            (Created, Staging) | (Staging, Flushing) | (Flushing, Finalizing) | (Finalizing, Done) => {
                true
            },
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Created => "CREATED",
            LoadState::Staging => "STAGING",
            LoadState::Flushing => "FLUSHING",
            LoadState::Finalizing => "FINALIZING",
            LoadState::Done => "DONE",
            LoadState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// An entity type together with the writers and SQL that normalize it.
///
/// `stage` fans one entity out to the group's writers; `flush_all` drains
/// every writer; `finalize_statements` resolve staged natural keys into the
/// permanent tables, in dependency order.
#[async_trait]
pub trait EntityGroup: Send {
    type Entity: Send + 'static;

    fn name(&self) -> &'static str;

    /// Statements creating the run-scoped staging tables
    fn staging_ddl(&self) -> &'static [&'static str];

    async fn stage<S: Store>(&mut self, entity: Self::Entity, store: &mut S) -> Result<()>;

    async fn flush_all<S: Store>(&mut self, store: &mut S) -> Result<()>;

    fn finalize_statements(&self) -> &'static [&'static str];
}

/// Summary of one finished load
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub group: &'static str,
    pub entities: usize,
    /// Rows the finalize statements reported as inserted
    pub finalized_rows: u64,
    pub elapsed: Duration,
}

/// Drives one entity group through a load inside a borrowed session
pub struct StagedLoad<'s, S: Store> {
    store: &'s mut S,
    state: LoadState,
    progress_every: usize,
}

impl<'s, S: Store> StagedLoad<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            state: LoadState::Created,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    /// Log progress every `every` entities; 0 disables progress messages
    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every;
        self
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Stage every entity, flush, then finalize.
    ///
    /// The stream is consumed exactly once. An `Err` item aborts the load.
    pub async fn run<G, E>(&mut self, group: &mut G, entities: E) -> Result<LoadReport>
    where
        G: EntityGroup,
        E: Stream<Item = Result<G::Entity>>,
    {
        if self.state != LoadState::Created {
            return Err(IngestError::InvalidTransition {
                from: self.state,
                to: LoadState::Staging,
            });
        }

        let started = Instant::now();
        info!(group = group.name(), "Starting load");

        match self.drive(group, entities).await {
            Ok((entities, finalized_rows)) => {
                let report = LoadReport {
                    group: group.name(),
                    entities,
                    finalized_rows,
                    elapsed: started.elapsed(),
                };
                info!(
                    group = report.group,
                    entities = report.entities,
                    finalized_rows = report.finalized_rows,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "Load finished"
                );
                Ok(report)
            },
            Err(e) => {
                error!(
                    group = group.name(),
                    state = %self.state,
                    store_failure = e.is_store_failure(),
                    error = %e,
                    "Load failed"
                );
                self.state = LoadState::Failed;
                Err(e)
            },
        }
    }

    async fn drive<G, E>(&mut self, group: &mut G, entities: E) -> Result<(usize, u64)>
    where
        G: EntityGroup,
        E: Stream<Item = Result<G::Entity>>,
    {
        for ddl in group.staging_ddl() {
            self.store.execute(ddl, &[]).await?;
        }

        self.advance(LoadState::Staging)?;
        let mut entities = std::pin::pin!(entities);
        let mut count = 0usize;
        while let Some(entity) = entities.next().await {
            group.stage(entity?, &mut *self.store).await?;
            count += 1;
            if self.progress_every > 0 && count % self.progress_every == 0 {
                debug!(group = group.name(), entities = count, "Staging progress");
            }
        }

        self.advance(LoadState::Flushing)?;
        group.flush_all(&mut *self.store).await?;

        self.advance(LoadState::Finalizing)?;
        let mut finalized = 0;
        for statement in group.finalize_statements() {
            finalized += self.store.execute(statement, &[]).await?;
        }

        self.advance(LoadState::Done)?;
        Ok((count, finalized))
    }

    fn advance(&mut self, next: LoadState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            return Err(IngestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(from = %self.state, to = %next, "Load state transition");
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_only() {
        use LoadState::*;
        assert!(Created.can_advance_to(Staging));
        assert!(Finalizing.can_advance_to(Done));
        assert!(!Created.can_advance_to(Finalizing));
        assert!(!Flushing.can_advance_to(Staging));
        assert!(!Done.can_advance_to(Staging));
    }

    #[test]
    fn test_failed_reachable_until_terminal() {
        use LoadState::*;
        for state in [Created, Staging, Flushing, Finalizing] {
            assert!(state.can_advance_to(Failed), "{state} -> FAILED");
        }
        assert!(!Done.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Failed));
    }
}
