//! Directory reconstruction.
//!
//! Directories do not exist anywhere; a listing is recomputed from the store on
//! every call:
//!
//! - `Parent` (the repository root): just the sync root folder
//! - `Root`: one folder per record type, whether or not any records exist
//! - `Bucket(t)`: `<id>.<ext>` for each visible record of type `t` under the
//!   bound workspace, plus a folder named after the type `t` nests under
//! - `Marker`: that folder, always empty
//! - `Record` and `Outside`: not a directory, so not-found

use docsync_types::RecordType;

use super::error::{VfsError, VfsResult};
use super::path::{PathCodec, SyncPath};
use super::types::DirEntry;
use crate::store::DocumentStore;

/// Computes directory entries for virtual paths.
pub struct DirectoryLister<'a> {
    store: &'a dyn DocumentStore,
    paths: &'a PathCodec,
    workspace_id: &'a str,
}

impl<'a> DirectoryLister<'a> {
    pub fn new(store: &'a dyn DocumentStore, paths: &'a PathCodec, workspace_id: &'a str) -> Self {
        Self {
            store,
            paths,
            workspace_id,
        }
    }

    /// List a decoded path. `display` is the caller's original path, used in errors.
    ///
    /// Entries come back sorted by name so tree hashes are stable.
    pub async fn list(&self, path: &SyncPath, display: &str) -> VfsResult<Vec<DirEntry>> {
        let mut entries = match path {
            SyncPath::Parent => vec![DirEntry::directory(self.paths.root())],
            SyncPath::Root => RecordType::all()
                .map(|t| DirEntry::directory(t.as_str()))
                .collect(),
            SyncPath::Bucket(record_type) => self.bucket(*record_type, display).await?,
            SyncPath::Marker(_) => Vec::new(),
            SyncPath::Outside | SyncPath::Record { .. } => {
                return Err(VfsError::not_found(display));
            }
        };

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Ok(entries)
    }

    async fn bucket(&self, record_type: RecordType, display: &str) -> VfsResult<Vec<DirEntry>> {
        // The workspace may have been removed mid-checkout.
        let Some(workspace) = self
            .store
            .get(RecordType::Workspace, self.workspace_id)
            .await?
        else {
            return Err(VfsError::not_found(display));
        };

        let traversal = record_type.with_nesting_ancestors();
        let records = self.store.find_descendants(&workspace, &traversal).await?;

        let mut entries: Vec<DirEntry> = records
            .iter()
            .filter(|r| r.record_type == record_type && !r.is_private)
            .map(|r| DirEntry::file(self.paths.file_name(&r.id)))
            .collect();

        if let Some(parent) = record_type.nests_under() {
            entries.push(DirEntry::directory(parent.as_str()));
        }

        tracing::trace!(
            bucket = %record_type,
            scanned = records.len(),
            listed = entries.len(),
            "reconstructed bucket listing"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use docsync_types::Record;

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn store() -> MemoryStore {
        MemoryStore::with_records([
            Record::new(RecordType::Workspace, "wrk_1").with_parent("proj_1"),
            Record::new(RecordType::RequestGroup, "fld_1").with_parent("wrk_1"),
            Record::new(RecordType::Request, "req_b").with_parent("fld_1"),
            Record::new(RecordType::Request, "req_a").with_parent("wrk_1"),
            Record::new(RecordType::Request, "req_secret")
                .with_parent("wrk_1")
                .private(),
            Record::new(RecordType::WebSocketRequest, "ws_1").with_parent("fld_1"),
            Record::new(RecordType::WebSocketPayload, "wsp_1").with_parent("ws_1"),
            Record::new(RecordType::Environment, "env_other").with_parent("wrk_2"),
        ])
    }

    #[tokio::test]
    async fn test_parent_lists_sync_root() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let entries = lister.list(&SyncPath::Parent, "/").await.unwrap();
        assert_eq!(entries, vec![DirEntry::directory(".insomnia")]);
    }

    #[tokio::test]
    async fn test_unrecognised_path_is_not_found() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let err = lister
            .list(&SyncPath::Outside, ".insomnia/Cookie")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(".insomnia/Cookie"));
    }

    #[tokio::test]
    async fn test_marker_is_empty() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let entries = lister
            .list(
                &SyncPath::Marker(RecordType::Request),
                ".insomnia/Request/RequestGroup",
            )
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_root_lists_every_bucket_even_when_empty() {
        let store = MemoryStore::new();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let entries = lister.list(&SyncPath::Root, ".insomnia").await.unwrap();

        assert_eq!(entries.len(), 14);
        assert!(entries.iter().all(|e| e.kind.is_dir()));
        let listed = names(&entries);
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(listed, sorted);
    }

    #[tokio::test]
    async fn test_bucket_with_nesting() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let entries = lister
            .list(&SyncPath::Bucket(RecordType::Request), ".insomnia/Request")
            .await
            .unwrap();
        assert_eq!(
            names(&entries),
            vec!["RequestGroup", "req_a.json", "req_b.json"]
        );
        assert!(entries[0].kind.is_dir());
        assert!(entries[1].kind.is_file());
    }

    #[tokio::test]
    async fn test_payloads_reachable_through_two_levels() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let entries = lister
            .list(
                &SyncPath::Bucket(RecordType::WebSocketPayload),
                ".insomnia/WebSocketPayload",
            )
            .await
            .unwrap();
        assert_eq!(names(&entries), vec!["WebSocketRequest", "wsp_1.json"]);
    }

    #[tokio::test]
    async fn test_workspace_bucket_lists_bound_workspace() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let entries = lister
            .list(&SyncPath::Bucket(RecordType::Workspace), ".insomnia/Workspace")
            .await
            .unwrap();
        assert_eq!(names(&entries), vec!["wrk_1.json"]);
    }

    #[tokio::test]
    async fn test_other_workspaces_are_invisible() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let entries = lister
            .list(&SyncPath::Bucket(RecordType::Environment), ".insomnia/Environment")
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_missing_workspace_is_not_found() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_gone");
        let err = lister
            .list(&SyncPath::Bucket(RecordType::Request), ".insomnia/Request")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_record_path_is_not_a_directory() {
        let store = store();
        let paths = PathCodec::new(".insomnia", "json");
        let lister = DirectoryLister::new(&store, &paths, "wrk_1");
        let path = SyncPath::Record {
            record_type: RecordType::Request,
            id: "req_a".into(),
        };
        let err = lister
            .list(&path, ".insomnia/Request/req_a.json")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("ENOENT"));
    }
}
