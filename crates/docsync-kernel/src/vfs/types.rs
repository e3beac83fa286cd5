//! Core VFS types.
//!
//! Everything here is synthesized: the tree has no inodes, directories have no
//! timestamps of their own, and permissions are fixed. Access control happens
//! at the record level, not here.

use serde::{Deserialize, Serialize};

/// Permission bits reported for every entry.
pub const DEFAULT_PERM: u32 = 0o777;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file (one record).
    File,
    /// Directory (the root, a type bucket, or the sync root itself).
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// File attributes (metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttr {
    /// File type.
    pub kind: FileType,
    /// Size in bytes of the encoded record; 0 for directories.
    pub size: u64,
    /// Synthetic inode: the record id for files, `None` (reported as 0) for directories.
    pub ino: Option<String>,
    /// Last modification, unix milliseconds; 0 for directories.
    pub mtime: u64,
    /// Unix permissions.
    pub perm: u32,
}

impl FileAttr {
    /// Attributes for an encoded record.
    pub fn file(size: u64, record_id: impl Into<String>, mtime: u64) -> Self {
        Self {
            kind: FileType::File,
            size,
            ino: Some(record_id.into()),
            mtime,
            perm: DEFAULT_PERM,
        }
    }

    /// Attributes for a virtual directory.
    pub fn directory() -> Self {
        Self {
            kind: FileType::Directory,
            size: 0,
            ino: None,
            mtime: 0,
            perm: DEFAULT_PERM,
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Inode as reported to callers that expect a plain value.
    pub fn ino_or_zero(&self) -> &str {
        self.ino.as_deref().unwrap_or("0")
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FileType::File)
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, FileType::Directory)
    }
}
