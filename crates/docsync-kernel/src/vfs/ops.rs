//! VFS operations trait.
//!
//! The surface a version-control engine expects from a filesystem module,
//! reduced to whole-file operations. Paths are relative to the repository
//! root; leading `/` and `.` segments are ignored.

use async_trait::async_trait;
use std::path::Path;

use super::types::{DirEntry, FileAttr};
use super::{VfsError, VfsResult};

/// Core VFS operations trait.
#[async_trait]
pub trait VfsOps: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Read a whole file.
    async fn read(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Read directory entries, sorted by name.
    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    /// Get file attributes.
    async fn stat(&self, path: &Path) -> VfsResult<FileAttr>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Replace a whole file.
    async fn write(&self, path: &Path, data: &[u8]) -> VfsResult<()>;

    /// Remove a file.
    async fn unlink(&self, path: &Path) -> VfsResult<()>;

    /// Create a directory.
    async fn mkdir(&self, path: &Path) -> VfsResult<()>;

    /// Remove a directory.
    async fn rmdir(&self, path: &Path) -> VfsResult<()>;

    /// Create a symbolic link at `path` pointing to `target`.
    async fn symlink(&self, target: &Path, path: &Path) -> VfsResult<()>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Read a whole file as UTF-8 text.
    async fn read_to_string(&self, path: &Path) -> VfsResult<String> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes).map_err(|e| VfsError::other(format!("not UTF-8: {e}")))
    }

    /// Attributes without following links. There are no links, so this is `stat`.
    async fn lstat(&self, path: &Path) -> VfsResult<FileAttr> {
        self.stat(path).await
    }

    /// Read a link target. Without links this reads the file itself.
    async fn readlink(&self, path: &Path) -> VfsResult<Vec<u8>> {
        self.read(path).await
    }

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool {
        self.stat(path).await.is_ok()
    }
}
