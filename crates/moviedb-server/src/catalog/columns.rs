//! Column allow-lists for the read views
//!
//! Filter and projection names arrive straight from the query string and end
//! up as identifiers in SQL text, so they are checked against the view's real
//! columns first. Each view's column set is read from
//! `information_schema.columns` on first use and kept for the process lifetime.

use moviedb_common::schema::{CAST_VIEW, CREW_VIEW, MOVIES_VIEW};
use sqlx::PgPool;
use std::collections::BTreeSet;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Queryable read views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Movies,
    Cast,
    Crew,
}

impl View {
    pub fn name(self) -> &'static str {
        match self {
            View::Movies => MOVIES_VIEW,
            View::Cast => CAST_VIEW,
            View::Crew => CREW_VIEW,
        }
    }

    fn slot(self) -> usize {
        match self {
            View::Movies => 0,
            View::Cast => 1,
            View::Crew => 2,
        }
    }
}

/// Lazily loaded column names per view
#[derive(Debug, Default)]
pub struct ColumnAllowList {
    views: [OnceCell<BTreeSet<String>>; 3],
}

impl ColumnAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow-list with fixed columns, never consulting the database for
    /// the views given here
    pub fn preloaded<I, S>(entries: impl IntoIterator<Item = (View, I)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = Self::new();
        for (view, columns) in entries {
            let columns = columns.into_iter().map(Into::into).collect();
            // a view listed twice keeps its first column set
            let _ = list.views[view.slot()].set(columns);
        }
        list
    }

    pub async fn columns(&self, pool: &PgPool, view: View) -> AppResult<&BTreeSet<String>> {
        self.views[view.slot()]
            .get_or_try_init(|| load_columns(pool, view))
            .await
    }
}

async fn load_columns(pool: &PgPool, view: View) -> AppResult<BTreeSet<String>> {
    let columns: Vec<String> = sqlx::query_scalar(
        "SELECT column_name::text FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = $1",
    )
    .bind(view.name())
    .fetch_all(pool)
    .await?;

    if columns.is_empty() {
        return Err(AppError::Internal(format!(
            "view {} has no columns; have migrations been applied?",
            view.name()
        )));
    }

    debug!(view = view.name(), columns = columns.len(), "Loaded column allow-list");
    Ok(columns.into_iter().collect())
}
