//! In-memory store for exercising loads without a database
//!
//! Records every statement and every inserted row, and can be told to reject
//! writes to given targets or statements containing a fragment.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};

use crate::engine::{SqlValue, Store};
use crate::error::{IngestError, Result};

/// Rows written to one target, in arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    pub batches: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    statements: Vec<(String, Vec<SqlValue>)>,
    tables: BTreeMap<String, MemoryTable>,
    failing_targets: HashSet<String>,
    failing_fragments: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every batched write to `target`
    pub fn fail_writes_to(mut self, target: impl Into<String>) -> Self {
        self.failing_targets.insert(target.into());
        self
    }

    /// Reject every statement whose text contains `fragment`
    pub fn fail_statements_containing(mut self, fragment: impl Into<String>) -> Self {
        self.failing_fragments.push(fragment.into());
        self
    }

    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(|(sql, _)| sql.as_str())
    }

    pub fn table(&self, target: &str) -> Option<&MemoryTable> {
        self.tables.get(target)
    }

    pub fn rows(&self, target: &str) -> &[Vec<SqlValue>] {
        self.tables
            .get(target)
            .map(|t| t.rows.as_slice())
            .unwrap_or(&[])
    }

    /// Every value of `column` written to `target`, in order
    pub fn column(&self, target: &str, column: &str) -> Vec<SqlValue> {
        let Some(table) = self.tables.get(target) else {
            return Vec::new();
        };
        let Some(idx) = table.columns.iter().position(|c| c == column) else {
            return Vec::new();
        };
        table.rows.iter().map(|row| row[idx].clone()).collect()
    }

    /// Text values of `column` in `target`, nulls skipped
    pub fn texts(&self, target: &str, column: &str) -> Vec<String> {
        self.column(target, column)
            .iter()
            .filter_map(|v| v.as_text().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn execute(&mut self, statement: &str, params: &[SqlValue]) -> Result<u64> {
        if self.failing_fragments.iter().any(|f| statement.contains(f.as_str())) {
            return Err(IngestError::Statement {
                message: format!("rejected statement: {}", statement.trim()),
            });
        }
        self.statements.push((statement.to_string(), params.to_vec()));
        Ok(0)
    }

    async fn insert_rows(
        &mut self,
        target: &str,
        columns: &[&str],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<u64> {
        if self.failing_targets.contains(target) {
            return Err(IngestError::write(target, "rejected by store"));
        }

        let table = self.tables.entry(target.to_string()).or_default();
        if table.columns.is_empty() {
            table.columns = columns.iter().map(|c| c.to_string()).collect();
        }
        let written = rows.len() as u64;
        table.rows.extend(rows);
        table.batches += 1;
        Ok(written)
    }

    async fn commit(self) -> Result<()> {
        Ok(())
    }
}
