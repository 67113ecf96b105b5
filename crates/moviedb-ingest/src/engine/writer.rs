//! Batched writers
//!
//! A [`BatchWriter`] buffers records of one type and writes them to one target
//! in batches of `batch_size`, optionally suppressing repeats through a
//! [`DedupCache`]. A [`ValueWriter`] does the same for bare string attributes
//! such as titles or job names.

use std::hash::Hash;
use tracing::debug;

use crate::engine::{DedupCache, Record, Schema, SqlValue, Store};
use crate::error::{IngestError, Result};

/// Counters kept by every writer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Records admitted into a batch
    pub accepted: usize,
    /// Records dropped because their key was cached
    pub deduplicated: usize,
    pub flushes: usize,
    /// Rows the store reported as inserted
    pub written: u64,
}

struct KeyedCache<R, K> {
    cache: DedupCache<K>,
    key_of: fn(&R) -> K,
}

pub struct BatchWriter<R, K = ()> {
    target: String,
    schema: Schema,
    batch_size: usize,
    batch: Vec<R>,
    dedup: Option<KeyedCache<R, K>>,
    stats: WriterStats,
}

impl<R: Record> BatchWriter<R, ()> {
    /// Writer without deduplication
    pub fn new(target: impl Into<String>, batch_size: usize) -> Result<Self> {
        Self::build(target.into(), batch_size, None)
    }
}

impl<R, K> BatchWriter<R, K>
where
    R: Record,
    K: Eq + Hash + Send + Sync + 'static,
{
    /// Writer that skips records whose `key_of` was already written this run
    pub fn with_cache(
        target: impl Into<String>,
        batch_size: usize,
        capacity: usize,
        key_of: fn(&R) -> K,
    ) -> Result<Self> {
        let dedup = KeyedCache {
            cache: DedupCache::new(capacity),
            key_of,
        };
        Self::build(target.into(), batch_size, Some(dedup))
    }

    fn build(target: String, batch_size: usize, dedup: Option<KeyedCache<R, K>>) -> Result<Self> {
        if batch_size == 0 {
            return Err(IngestError::Config(format!(
                "batch size for {} must be greater than 0",
                target
            )));
        }
        Ok(Self {
            schema: Schema::of::<R>()?,
            target,
            batch_size,
            batch: Vec::with_capacity(batch_size),
            dedup,
            stats: WriterStats::default(),
        })
    }

    /// Replace the derived column layout
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Admit one record, flushing when the batch reaches `batch_size`
    pub async fn append<S: Store>(&mut self, record: R, store: &mut S) -> Result<()> {
        if let Some(dedup) = self.dedup.as_mut() {
            let key = (dedup.key_of)(&record);
            if !dedup.cache.admit(key) {
                self.stats.deduplicated += 1;
                return Ok(());
            }
        }

        self.batch.push(record);
        self.stats.accepted += 1;

        if self.batch.len() >= self.batch_size {
            self.flush(store).await?;
        }
        Ok(())
    }

    /// Append every record in order; `None` is an empty sequence
    pub async fn extend<S, I>(&mut self, records: Option<I>, store: &mut S) -> Result<()>
    where
        S: Store,
        I: IntoIterator<Item = R>,
    {
        let Some(records) = records else {
            return Ok(());
        };
        let records: Vec<R> = records.into_iter().collect();
        for record in records {
            self.append(record, store).await?;
        }
        Ok(())
    }

    /// Write the pending batch. The batch is kept if the store rejects it.
    pub async fn flush<S: Store>(&mut self, store: &mut S) -> Result<u64> {
        if self.batch.is_empty() {
            return Ok(0);
        }

        let rows = self
            .batch
            .iter()
            .map(|record| {
                let row = record.values();
                self.schema.check_row(&row)?;
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;

        let written = store
            .insert_rows(&self.target, self.schema.columns(), rows)
            .await?;

        debug!(
            target_table = %self.target,
            rows = self.batch.len(),
            written,
            "Flushed batch"
        );

        self.batch.clear();
        self.stats.flushes += 1;
        self.stats.written += written;
        Ok(written)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Records waiting for the next flush
    pub fn pending(&self) -> &[R] {
        &self.batch
    }

    /// Keys currently held by the dedup cache
    pub fn cached(&self) -> usize {
        self.dedup.as_ref().map_or(0, |d| d.cache.len())
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }
}

/// A string attribute whose identity is its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue(pub String);

impl Record for AttributeValue {
    fn export_order() -> &'static [&'static str] {
        &["value"]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.0.as_str().into()]
    }
}

/// Writer for bare string values into a one-column lookup table.
///
/// Values are trimmed; null and blank values are dropped. Deduplication keys
/// on the trimmed value itself.
pub struct ValueWriter {
    inner: BatchWriter<AttributeValue, String>,
}

impl ValueWriter {
    pub fn new(
        table: impl Into<String>,
        column: &'static str,
        batch_size: usize,
        cache_capacity: usize,
    ) -> Result<Self> {
        let inner = BatchWriter::with_cache(table, batch_size, cache_capacity, |v: &AttributeValue| {
            v.0.clone()
        })?
        .with_schema(Schema::single("AttributeValue", column));
        Ok(Self { inner })
    }

    pub async fn append<S: Store>(&mut self, value: Option<&str>, store: &mut S) -> Result<()> {
        match normalize(value) {
            Some(value) => self.inner.append(AttributeValue(value), store).await,
            None => Ok(()),
        }
    }

    pub async fn extend<'a, S, I>(&mut self, values: I, store: &mut S) -> Result<()>
    where
        S: Store,
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let values: Vec<String> = values.into_iter().filter_map(normalize).collect();
        for value in values {
            self.inner.append(AttributeValue(value), store).await?;
        }
        Ok(())
    }

    pub async fn flush<S: Store>(&mut self, store: &mut S) -> Result<u64> {
        self.inner.flush(store).await
    }

    pub fn target(&self) -> &str {
        self.inner.target()
    }

    pub fn pending(&self) -> Vec<&str> {
        self.inner.pending().iter().map(|v| v.0.as_str()).collect()
    }

    pub fn cached(&self) -> usize {
        self.inner.cached()
    }

    pub fn stats(&self) -> WriterStats {
        self.inner.stats()
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryStore;

    #[tokio::test]
    async fn test_blank_values_are_dropped() {
        let mut store = MemoryStore::new();
        let mut writer = ValueWriter::new("titles", "title", 10, 10).unwrap();

        writer.append(None, &mut store).await.unwrap();
        writer.append(Some("   "), &mut store).await.unwrap();
        writer.extend([Some(""), None], &mut store).await.unwrap();

        assert!(writer.pending().is_empty());
        assert_eq!(writer.cached(), 0);
        assert_eq!(writer.stats(), WriterStats::default());
    }

    #[tokio::test]
    async fn test_values_are_trimmed_before_dedup() {
        let mut store = MemoryStore::new();
        let mut writer = ValueWriter::new("titles", "title", 10, 10).unwrap();

        writer
            .extend([Some(" Heat "), Some("Heat"), Some("Ronin")], &mut store)
            .await
            .unwrap();

        assert_eq!(writer.pending(), vec!["Heat", "Ronin"]);
        assert_eq!(writer.stats().deduplicated, 1);
    }

    #[tokio::test]
    async fn test_flush_uses_value_column() {
        let mut store = MemoryStore::new();
        let mut writer = ValueWriter::new("jobs", "job", 10, 10).unwrap();

        writer.append(Some("Director"), &mut store).await.unwrap();
        assert_eq!(writer.flush(&mut store).await.unwrap(), 1);

        assert_eq!(store.table("jobs").unwrap().columns, vec!["job"]);
        assert_eq!(store.texts("jobs", "job"), vec!["Director"]);
        assert!(writer.pending().is_empty());
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        assert!(matches!(
            ValueWriter::new("jobs", "job", 0, 10),
            Err(IngestError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_batch() {
        let mut store = MemoryStore::new().fail_writes_to("jobs");
        let mut writer = ValueWriter::new("jobs", "job", 10, 10).unwrap();

        writer.append(Some("Editor"), &mut store).await.unwrap();
        let err = writer.flush(&mut store).await.unwrap_err();

        assert!(matches!(err, IngestError::Write { .. }));
        assert_eq!(writer.pending(), vec!["Editor"]);
    }
}
