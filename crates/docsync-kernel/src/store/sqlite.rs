//! SQLite document store.
//!
//! One row per record. The full record lives in `body` as JSON; the columns
//! next to it exist so parent/child walks and lookups stay indexed.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use docsync_types::{Record, RecordType};

use super::{stamp, ChangeSource, DocumentStore, StoreError, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    type TEXT NOT NULL,
    id TEXT NOT NULL,
    parent_id TEXT,
    is_private INTEGER NOT NULL DEFAULT 0,
    modified INTEGER NOT NULL DEFAULT 0,
    body TEXT NOT NULL,
    PRIMARY KEY (type, id)
);
CREATE INDEX IF NOT EXISTS idx_records_parent ON records(parent_id);
"#;

/// SQLite-backed document store.
///
/// The connection sits behind a mutex; every public operation holds it for
/// one statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish()
    }
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn decode_body(body: &str) -> StoreResult<Record> {
        Ok(serde_json::from_str(body)?)
    }

    fn children(conn: &Connection, parent_id: &str) -> StoreResult<Vec<Record>> {
        let mut stmt = conn.prepare_cached("SELECT body FROM records WHERE parent_id = ?1")?;
        let rows = stmt.query_map(params![parent_id], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for body in rows {
            records.push(Self::decode_body(&body?)?);
        }
        Ok(records)
    }

    /// Breadth-first walk below `root_id`, only through records accepted by `accept`.
    ///
    /// Each level is sorted by `(type, id)` so results match [`super::MemoryStore`].
    fn walk(
        conn: &Connection,
        root_id: &str,
        accept: impl Fn(&Record) -> bool,
    ) -> StoreResult<Vec<Record>> {
        let mut found: Vec<Record> = Vec::new();
        let mut seen: Vec<String> = vec![root_id.to_string()];
        let mut frontier: Vec<String> = vec![root_id.to_string()];

        while !frontier.is_empty() {
            let mut level = Vec::new();
            for parent_id in &frontier {
                for child in Self::children(conn, parent_id)? {
                    if accept(&child) && !seen.contains(&child.id) {
                        seen.push(child.id.clone());
                        level.push(child);
                    }
                }
            }
            level.sort_by(|a, b| (a.record_type, &a.id).cmp(&(b.record_type, &b.id)));
            frontier = level.iter().map(|r| r.id.clone()).collect();
            found.extend(level);
        }
        Ok(found)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, record_type: RecordType, id: &str) -> StoreResult<Option<Record>> {
        let conn = self.conn.lock();
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM records WHERE type = ?1 AND id = ?2",
                params![record_type.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        body.as_deref().map(Self::decode_body).transpose()
    }

    async fn upsert(&self, record: Record, source: ChangeSource) -> StoreResult<Record> {
        let record = stamp(record, source);
        let body = serde_json::to_string(&record)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO records (type, id, parent_id, is_private, modified, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(type, id) DO UPDATE SET
                parent_id = excluded.parent_id,
                is_private = excluded.is_private,
                modified = excluded.modified,
                body = excluded.body",
            params![
                record.record_type.as_str(),
                record.id,
                record.parent_id,
                record.is_private,
                record.modified as i64,
                body,
            ],
        )?;
        Ok(record)
    }

    async fn remove(&self, record: &Record, _source: ChangeSource) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM records WHERE type = ?1 AND id = ?2",
            params![record.record_type.as_str(), record.id],
        )?;
        Ok(())
    }

    async fn find_descendants(
        &self,
        root: &Record,
        types: &[RecordType],
    ) -> StoreResult<Vec<Record>> {
        let conn = self.conn.lock();
        let mut result = vec![root.clone()];
        result.extend(Self::walk(&conn, &root.id, |r| {
            types.contains(&r.record_type)
        })?);
        Ok(result)
    }

    async fn all(&self) -> StoreResult<Vec<Record>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT type, body FROM records")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (type_name, body) = row?;
            if RecordType::from_str(&type_name).is_none() {
                return Err(StoreError::UnknownType(type_name));
            }
            records.push(Self::decode_body(&body)?);
        }
        records.sort_by(|a, b| (a.record_type, &a.id).cmp(&(b.record_type, &b.id)));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        let conn = store.conn.lock();
        for record in [
            Record::new(RecordType::Workspace, "wrk_1").with_parent("proj_1"),
            Record::new(RecordType::RequestGroup, "fld_1").with_parent("wrk_1"),
            Record::new(RecordType::Request, "req_1").with_parent("wrk_1"),
            Record::new(RecordType::Request, "req_2").with_parent("fld_1"),
        ] {
            conn.execute(
                "INSERT INTO records (type, id, parent_id, is_private, modified, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.record_type.as_str(),
                    record.id,
                    record.parent_id,
                    record.is_private,
                    record.modified as i64,
                    serde_json::to_string(&record).unwrap(),
                ],
            )
            .unwrap();
        }
        drop(conn);
        store
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        let record = Record::new(RecordType::Environment, "env_1")
            .with_parent("wrk_1")
            .with_modified(99)
            .with_field("data", serde_json::json!({"base_url": "http://localhost"}));

        store.upsert(record.clone(), ChangeSource::Sync).await.unwrap();
        let got = store.get(RecordType::Environment, "env_1").await.unwrap();
        assert_eq!(got, Some(record));
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert(
                Record::new(RecordType::Request, "req_1").with_field("name", "old"),
                ChangeSource::Sync,
            )
            .await
            .unwrap();
        store
            .upsert(
                Record::new(RecordType::Request, "req_1").with_field("name", "new"),
                ChangeSource::Sync,
            )
            .await
            .unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].field("name"), Some(&serde_json::Value::from("new")));
    }

    #[tokio::test]
    async fn test_find_descendants_matches_memory_order() {
        let store = seeded();
        let root = store.get(RecordType::Workspace, "wrk_1").await.unwrap().unwrap();
        let found = store
            .find_descendants(&root, &[RecordType::RequestGroup, RecordType::Request])
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["wrk_1", "fld_1", "req_1", "req_2"]);
    }

    #[tokio::test]
    async fn test_remove_leaves_children() {
        let store = seeded();
        let group = store.get(RecordType::RequestGroup, "fld_1").await.unwrap().unwrap();
        store.remove(&group, ChangeSource::Sync).await.unwrap();

        assert!(store.get(RecordType::RequestGroup, "fld_1").await.unwrap().is_none());
        assert!(store.get(RecordType::Request, "req_2").await.unwrap().is_some());
        assert_eq!(store.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .upsert(Record::new(RecordType::ApiSpec, "spc_1"), ChangeSource::Sync)
                .await
                .unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert!(reopened.get(RecordType::ApiSpec, "spc_1").await.unwrap().is_some());
    }
}
