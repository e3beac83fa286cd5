//! VFS backends.
//!
//! Backends implement [`VfsOps`](super::VfsOps) for different storage types.

mod store;

pub use store::{StoreBackend, CONFLICT_MARKER};
