// Store boundary consumed by the engine, and its PostgreSQL implementation

use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use crate::engine::SqlValue;
use crate::error::{IngestError, Result};

/// PostgreSQL accepts at most this many bind parameters per statement
pub const MAX_BIND_PARAMS: usize = 65_535;

/// One transactional session against the relational store.
///
/// All writers of a load share one session. Nothing is durable until
/// [`Store::commit`]; dropping a session without committing abandons its work.
#[async_trait]
pub trait Store: Send {
    /// Run one parameterized statement, returning the affected row count
    async fn execute(&mut self, statement: &str, params: &[SqlValue]) -> Result<u64>;

    /// Insert many rows into `target`, ignoring rows that hit a uniqueness
    /// constraint. Identifiers come from record contracts, never from data.
    async fn insert_rows(
        &mut self,
        target: &str,
        columns: &[&str],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<u64>;

    async fn commit(self) -> Result<()>
    where
        Self: Sized;
}

/// A PostgreSQL transaction
pub struct PgStore {
    tx: Transaction<'static, Postgres>,
}

impl PgStore {
    pub async fn begin(pool: &PgPool) -> Result<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn execute(&mut self, statement: &str, params: &[SqlValue]) -> Result<u64> {
        let query = params
            .iter()
            .cloned()
            .fold(sqlx::query(statement), bind_value);

        let done = query
            .execute(&mut *self.tx)
            .await
            .map_err(|e| IngestError::Statement {
                message: e.to_string(),
            })?;

        Ok(done.rows_affected())
    }

    async fn insert_rows(
        &mut self,
        target: &str,
        columns: &[&str],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<u64> {
        if rows.is_empty() || columns.is_empty() {
            return Ok(0);
        }

        let rows_per_statement = (MAX_BIND_PARAMS / columns.len()).max(1);
        let header = format!("INSERT INTO {} ({}) ", target, columns.join(", "));
        let mut written = 0;

        for chunk in rows.chunks(rows_per_statement) {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(&header);

            query_builder.push_values(chunk, |mut b, row| {
                for value in row {
                    match value.clone() {
                        SqlValue::Bool(v) => {
                            b.push_bind(v);
                        },
                        SqlValue::Int(v) => {
                            b.push_bind(v);
                        },
                        SqlValue::Float(v) => {
                            b.push_bind(v);
                        },
                        SqlValue::Text(v) => {
                            b.push_bind(v);
                        },
                        SqlValue::Date(v) => {
                            b.push_bind(v);
                        },
                    }
                }
            });

            query_builder.push(" ON CONFLICT DO NOTHING");

            let done = query_builder
                .build()
                .execute(&mut *self.tx)
                .await
                .map_err(|e| IngestError::write(target, e))?;

            written += done.rows_affected();
        }

        debug!(target_table = %target, rows = rows.len(), written, "Inserted rows");
        Ok(written)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn bind_value(
    query: Query<'_, Postgres, PgArguments>,
    value: SqlValue,
) -> Query<'_, Postgres, PgArguments> {
    match value {
        SqlValue::Bool(v) => query.bind(v),
        SqlValue::Int(v) => query.bind(v),
        SqlValue::Float(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
    }
}
