//! Record model for docsync.
//!
//! This crate is the leaf of the workspace: the [`Record`] shape shared by the
//! document stores, the codec, and the filesystem adapter, plus the closed
//! [`RecordType`] set and its nesting table. It has **no internal docsync
//! dependencies**.

pub mod record;

pub use record::{Record, RecordType};

/// Current time as Unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
