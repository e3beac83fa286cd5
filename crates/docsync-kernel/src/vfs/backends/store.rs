//! Document store backend.
//!
//! Presents the records under one workspace as a directory tree that a
//! version-control engine can check out, diff and commit:
//!
//! ```text
//! .insomnia/
//!   Workspace/wrk_1.json
//!   RequestGroup/fld_1.json
//!   Request/
//!     RequestGroup/       # marker: requests may nest in request groups
//!     req_1.json
//! ```
//!
//! Every call goes straight to the store. Nothing is cached, so a record
//! changed through the client is visible on the next `read`.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use docsync_types::Record;

use crate::codec::{JsonCodec, KeyReset, RecordCodec};
use crate::config::{ConfigError, SyncConfig};
use crate::store::{ChangeSource, SharedDocumentStore};
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::listing::DirectoryLister;
use crate::vfs::ops::VfsOps;
use crate::vfs::path::{PathCodec, SyncPath};
use crate::vfs::stat::Resolved;
use crate::vfs::types::{DirEntry, FileAttr};

/// A line that only appears in files carrying unresolved merge conflicts.
pub const CONFLICT_MARKER: &str = "=======";

/// True when any line of `text` is exactly the conflict separator.
fn has_conflict_marker(text: &str) -> bool {
    text.lines()
        .any(|line| line.strip_suffix('\r').unwrap_or(line) == CONFLICT_MARKER)
}

/// Filesystem view of one workspace in a document store.
pub struct StoreBackend {
    store: SharedDocumentStore,
    workspace_id: String,
    project_id: Option<String>,
    paths: PathCodec,
    codec: Arc<dyn RecordCodec>,
    key_reset: KeyReset,
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBackend")
            .field("workspace_id", &self.workspace_id)
            .field("project_id", &self.project_id)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl StoreBackend {
    /// Bind a store to the workspace and project named in `config`.
    pub fn new(config: &SyncConfig, store: SharedDocumentStore) -> Result<Self, ConfigError> {
        config.validate()?;
        let codec: Arc<dyn RecordCodec> = Arc::new(JsonCodec);
        Ok(Self {
            store,
            workspace_id: config.workspace_id.clone(),
            project_id: config.project_id.clone(),
            paths: PathCodec::new(&config.sync_root, codec.extension()),
            codec,
            key_reset: KeyReset::default(),
        })
    }

    /// Use a different record encoding. File names follow its extension.
    pub fn with_codec(mut self, codec: Arc<dyn RecordCodec>) -> Self {
        self.paths = PathCodec::new(self.paths.root(), codec.extension());
        self.codec = codec;
        self
    }

    /// Replace the fields reset on read.
    pub fn with_key_reset(mut self, key_reset: KeyReset) -> Self {
        self.key_reset = key_reset;
        self
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn paths(&self) -> &PathCodec {
        &self.paths
    }

    pub fn store(&self) -> &SharedDocumentStore {
        &self.store
    }

    fn lister(&self) -> DirectoryLister<'_> {
        DirectoryLister::new(self.store.as_ref(), &self.paths, &self.workspace_id)
    }

    /// The record behind a path as it would be written out, if visible.
    async fn load(&self, path: &SyncPath) -> VfsResult<Option<Record>> {
        let SyncPath::Record { record_type, id } = path else {
            return Ok(None);
        };
        let Some(mut record) = self.store.get(*record_type, id).await? else {
            return Ok(None);
        };
        if record.is_private {
            return Ok(None);
        }
        self.key_reset.apply(&mut record);
        Ok(Some(record))
    }

    async fn resolve(&self, path: &Path) -> VfsResult<Resolved> {
        let decoded = self.paths.decode(path);

        if let Some(record) = self.load(&decoded).await? {
            let size = self.codec.encode(&record)?.len() as u64;
            return Ok(Resolved::File { size, record });
        }

        let display = path.to_string_lossy();
        match self.lister().list(&decoded, &display).await {
            Ok(_) => Ok(Resolved::Directory),
            Err(e) if e.is_not_found() => Ok(Resolved::Missing),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl VfsOps for StoreBackend {
    async fn read(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let decoded = self.paths.decode(path);
        match self.load(&decoded).await? {
            Some(record) => Ok(self.codec.encode(&record)?),
            None => Err(VfsError::not_found_in("open", path.to_string_lossy())),
        }
    }

    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let decoded = self.paths.decode(path);
        self.lister().list(&decoded, &path.to_string_lossy()).await
    }

    async fn stat(&self, path: &Path) -> VfsResult<FileAttr> {
        self.resolve(path).await?.into_attr(&path.to_string_lossy())
    }

    async fn write(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        let decoded = self.paths.decode(path);
        if !decoded.in_root() {
            tracing::debug!(path = %path.display(), "ignoring write outside sync root");
            return Ok(());
        }

        if let Ok(text) = std::str::from_utf8(data)
            && has_conflict_marker(text)
        {
            tracing::info!(path = %path.display(), "skipping file with conflict markers");
            return Ok(());
        }

        let mut record = self.codec.decode(data)?;

        let path_id = decoded.record_id().unwrap_or("null");
        if record.id != path_id {
            return Err(VfsError::identity_mismatch("_id", path_id, record.id));
        }
        let path_type = decoded
            .record_type()
            .map(|t| t.as_str())
            .unwrap_or("null");
        if record.record_type.as_str() != path_type {
            return Err(VfsError::identity_mismatch(
                "type",
                path_type,
                record.record_type.as_str(),
            ));
        }

        if record.is_workspace() {
            tracing::debug!(
                workspace = %record.id,
                original = ?record.parent_id,
                project = ?self.project_id,
                "re-parenting workspace under active project"
            );
            record.parent_id = self.project_id.clone();
        }

        tracing::trace!(record_type = %record.record_type, id = %record.id, "sync upsert");
        self.store.upsert(record, ChangeSource::Sync).await?;
        Ok(())
    }

    async fn unlink(&self, path: &Path) -> VfsResult<()> {
        let SyncPath::Record { record_type, id } = self.paths.decode(path) else {
            return Err(VfsError::other(format!(
                "cannot unlink {}: not a record file",
                path.display()
            )));
        };

        let Some(record) = self.store.get(record_type, &id).await? else {
            return Ok(());
        };

        tracing::debug!(record_type = %record_type, id = %id, "sync remove");
        self.store.remove(&record, ChangeSource::Sync).await?;
        Ok(())
    }

    async fn mkdir(&self, _path: &Path) -> VfsResult<()> {
        Ok(())
    }

    async fn rmdir(&self, _path: &Path) -> VfsResult<()> {
        Ok(())
    }

    async fn symlink(&self, _target: &Path, _path: &Path) -> VfsResult<()> {
        Err(VfsError::Unsupported("symlink"))
    }
}
