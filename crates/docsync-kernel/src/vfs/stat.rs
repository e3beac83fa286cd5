//! Metadata synthesis.
//!
//! There is no real filesystem to ask, so `stat` is answered from what a path
//! resolves to: a readable record file, a listable directory, or nothing.

use docsync_types::Record;

use super::error::{VfsError, VfsResult};
use super::types::FileAttr;

/// What a path resolved to for `stat`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A record that reads successfully; `size` is the encoded length.
    File { size: u64, record: Record },
    /// A directory that lists successfully.
    Directory,
    /// Neither.
    Missing,
}

impl Resolved {
    /// Synthesize attributes, or not-found (syscall `stat`) for [`Resolved::Missing`].
    pub fn into_attr(self, path: &str) -> VfsResult<FileAttr> {
        match self {
            Resolved::File { size, record } => Ok(FileAttr::file(size, record.id, record.modified)),
            Resolved::Directory => Ok(FileAttr::directory()),
            Resolved::Missing => Err(VfsError::not_found_in("stat", path)),
        }
    }
}
