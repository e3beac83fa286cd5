//! In-memory document store.
//!
//! Used for tests and throwaway sessions. All data is lost when dropped.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use docsync_types::{Record, RecordType};

use super::{stamp, ChangeSource, DocumentStore, StoreResult};

type Key = (RecordType, String);

/// In-memory document store.
///
/// Thread-safe via internal `RwLock`. Records are keyed by `(type, id)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<Key, Record>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records, stored as-is.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records
            .into_iter()
            .map(|r| ((r.record_type, r.id.clone()), r))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Breadth-first walk from `root_id`, only through records accepted by `accept`.
    fn walk<'a>(
        records: &'a BTreeMap<Key, Record>,
        root_id: &str,
        accept: impl Fn(&Record) -> bool,
    ) -> Vec<&'a Record> {
        let mut found = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([root_id]);
        let mut frontier: Vec<&str> = vec![root_id];

        while !frontier.is_empty() {
            let level: Vec<&Record> = records
                .values()
                .filter(|r| {
                    r.parent_id
                        .as_deref()
                        .is_some_and(|p| frontier.contains(&p))
                })
                .filter(|r| accept(r) && !seen.contains(r.id.as_str()))
                .collect();

            frontier = level.iter().map(|r| r.id.as_str()).collect();
            seen.extend(frontier.iter().copied());
            found.extend(level);
        }
        found
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, record_type: RecordType, id: &str) -> StoreResult<Option<Record>> {
        let records = self.records.read();
        Ok(records.get(&(record_type, id.to_string())).cloned())
    }

    async fn upsert(&self, record: Record, source: ChangeSource) -> StoreResult<Record> {
        let record = stamp(record, source);
        let mut records = self.records.write();
        records.insert((record.record_type, record.id.clone()), record.clone());
        Ok(record)
    }

    async fn remove(&self, record: &Record, _source: ChangeSource) -> StoreResult<()> {
        self.records
            .write()
            .remove(&(record.record_type, record.id.clone()));
        Ok(())
    }

    async fn find_descendants(
        &self,
        root: &Record,
        types: &[RecordType],
    ) -> StoreResult<Vec<Record>> {
        let records = self.records.read();
        let mut result = vec![root.clone()];
        result.extend(
            Self::walk(&records, &root.id, |r| types.contains(&r.record_type))
                .into_iter()
                .cloned(),
        );
        Ok(result)
    }

    async fn all(&self) -> StoreResult<Vec<Record>> {
        Ok(self.records.read().values().cloned().collect())
    }
}
