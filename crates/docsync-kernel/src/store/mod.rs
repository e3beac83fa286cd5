//! Document store abstraction.
//!
//! The filesystem adapter never owns records; it asks a [`DocumentStore`] for
//! them on every call. Two implementations ship with the kernel:
//!
//! - [`MemoryStore`] - `BTreeMap` behind a lock (tests, ephemeral sessions)
//! - [`SqliteStore`] - one `records` table on SQLite (the CLI, real use)
//!
//! ## Descendant traversal
//!
//! `find_descendants(root, types)` returns the root first, then walks
//! children breadth-first. The walk only *passes through* records whose type
//! is in `types`, so asking for `[Request]` alone never reaches a request that
//! sits inside a request group; ask for `[Request, RequestGroup]` and filter.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use docsync_types::{Record, RecordType};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Who initiated a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// The local client (UI, scripts). Bumps `modified`.
    Local,
    /// Version-control synchronization. Stores the record exactly as given.
    Sync,
}

impl ChangeSource {
    pub fn is_sync(&self) -> bool {
        matches!(self, ChangeSource::Sync)
    }
}

/// Document store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored body could not be (de)serialized.
    #[error("record body: {0}")]
    Body(#[from] serde_json::Error),

    /// A stored type column holds an unknown record type.
    #[error("unknown record type in store: {0}")]
    UnknownType(String),
}

/// Document store result type.
pub type StoreResult<T> = Result<T, StoreError>;

/// Query/update primitives the filesystem adapter relies on.
///
/// Implementations must make each `upsert`/`remove` atomic per record and
/// serve reads that reflect the latest committed write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a record by type and id.
    async fn get(&self, record_type: RecordType, id: &str) -> StoreResult<Option<Record>>;

    /// Insert or replace a record. Returns the record as stored.
    async fn upsert(&self, record: Record, source: ChangeSource) -> StoreResult<Record>;

    /// Remove exactly this record. Children stay where they are; version
    /// control removes them file by file.
    async fn remove(&self, record: &Record, source: ChangeSource) -> StoreResult<()>;

    /// `root` followed by its descendants of the given types (see module docs).
    async fn find_descendants(
        &self,
        root: &Record,
        types: &[RecordType],
    ) -> StoreResult<Vec<Record>>;

    /// Every record in the store, ordered by type then id.
    async fn all(&self) -> StoreResult<Vec<Record>>;
}

/// Shared, thread-safe store handle.
pub type SharedDocumentStore = Arc<dyn DocumentStore>;

/// Stamp `modified` for local writes; sync writes keep what they carry.
pub(crate) fn stamp(mut record: Record, source: ChangeSource) -> Record {
    if source == ChangeSource::Local {
        record.modified = docsync_types::now_millis();
    }
    record
}
