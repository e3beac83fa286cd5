//! Virtual Filesystem abstraction.
//!
//! A path-based filesystem over the document store, shaped for a
//! version-control engine. Key components:
//!
//! - [`VfsOps`] - Core trait for filesystem operations
//! - [`PathCodec`] - Virtual paths to record identity and back
//! - [`DirectoryLister`] - Directory listings recomputed from the store
//! - [`StoreBackend`] - The adapter itself
//!
//! ## Design Decisions
//!
//! - **No stored directories**: the tree shape is implied by record types and
//!   parent links, so `mkdir`/`rmdir` succeed without doing anything.
//! - **Whole-file I/O**: records are small; reads and writes move the full
//!   encoded document.
//! - **One error callers branch on**: every missing path is `ENOENT`.

pub mod backends;
mod error;
mod listing;
mod ops;
mod path;
mod stat;
mod types;

pub use backends::{StoreBackend, CONFLICT_MARKER};
pub use error::{VfsError, VfsResult, ENOENT, ENOENT_ERRNO};
pub use listing::DirectoryLister;
pub use ops::VfsOps;
pub use path::{normalize, PathCodec, SyncPath};
pub use stat::Resolved;
pub use types::{DirEntry, FileAttr, FileType, DEFAULT_PERM};
