//! # docsync-kernel
//!
//! Presents a workspace of client records as a filesystem tree, so a
//! version-control engine can check out, diff, commit and merge records as
//! if they were ordinary files.
//!
//! - [`store`] - where records live ([`DocumentStore`], memory and SQLite)
//! - [`codec`] - how a record becomes file content
//! - [`vfs`] - the filesystem view ([`StoreBackend`] implements [`VfsOps`])
//! - [`tree`] - bulk export/import against a real directory
//! - [`config`] - session binding (workspace, project, sync root)

pub mod codec;
pub mod config;
pub mod store;
pub mod tree;
pub mod vfs;

pub use codec::{CodecError, JsonCodec, KeyReset, RecordCodec, ResetRule, YamlCodec};
pub use config::{ConfigError, SyncConfig, DEFAULT_SYNC_ROOT};
pub use store::{
    ChangeSource, DocumentStore, MemoryStore, SharedDocumentStore, SqliteStore, StoreError,
    StoreResult,
};
pub use tree::{export_tree, import_tree, ExportSummary, ImportSummary, TreeError};
pub use vfs::{
    DirEntry, FileAttr, FileType, PathCodec, StoreBackend, SyncPath, VfsError, VfsOps, VfsResult,
};

pub use docsync_types::{Record, RecordType};
