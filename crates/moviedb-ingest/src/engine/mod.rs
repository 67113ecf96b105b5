// Staged batch-ingestion engine
//
// Leaves first:
// - record: the contract mapping a value onto ordered, named columns
// - cache: bounded set of keys already written this run
// - writer: batched writers combining the two
// - store: the transactional store boundary and its PostgreSQL implementation
// - pipeline: the stage / flush / finalize protocol per entity group

pub mod cache;
pub mod memory;
pub mod pipeline;
pub mod record;
pub mod store;
pub mod writer;

pub use cache::DedupCache;
pub use memory::{MemoryStore, MemoryTable};
pub use pipeline::{EntityGroup, LoadReport, LoadState, StagedLoad, DEFAULT_PROGRESS_EVERY};
pub use record::{Record, Schema, SqlValue};
pub use store::{PgStore, Store, MAX_BIND_PARAMS};
pub use writer::{AttributeValue, BatchWriter, ValueWriter, WriterStats};
