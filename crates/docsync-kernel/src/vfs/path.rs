//! Path codec: virtual paths ⇄ record identity.
//!
//! The adapter owns exactly one reserved directory, the *sync root*. Inside it
//! the layout is fixed:
//!
//! ```text
//! /                               # SyncPath::Parent
//! <root>/                         # SyncPath::Root
//! <root>/<RecordType>/            # SyncPath::Bucket
//! <root>/<RecordType>/<Parent>/   # SyncPath::Marker
//! <root>/<RecordType>/<id>.<ext>  # SyncPath::Record
//! ```
//!
//! Anything else, including paths outside the root, decodes to
//! [`SyncPath::Outside`]. Callers decide what "nothing resolved" means for
//! their operation.

use std::path::{Path, PathBuf};

use docsync_types::RecordType;

/// What a virtual path points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPath {
    /// Nothing resolved: outside the sync root, or not a recognised shape.
    Outside,
    /// The repository root, which holds the sync root.
    Parent,
    /// The sync root itself.
    Root,
    /// A type bucket directory.
    Bucket(RecordType),
    /// Nesting marker inside a bucket, named after the type the bucket's
    /// records nest under. Always empty.
    Marker(RecordType),
    /// A record file.
    Record { record_type: RecordType, id: String },
}

impl SyncPath {
    /// True when the path is the sync root or below it.
    pub fn in_root(&self) -> bool {
        !matches!(self, SyncPath::Outside | SyncPath::Parent)
    }

    /// Record type, when one resolved.
    pub fn record_type(&self) -> Option<RecordType> {
        match self {
            SyncPath::Bucket(t) | SyncPath::Marker(t) => Some(*t),
            SyncPath::Record { record_type, .. } => Some(*record_type),
            SyncPath::Outside | SyncPath::Parent | SyncPath::Root => None,
        }
    }

    /// Record id, when one resolved.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            SyncPath::Record { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Normalize a path into segments: drop empty and `.` segments, let `..` pop,
/// and accept both `/` and `\` as separators.
pub fn normalize(path: &Path) -> Vec<String> {
    let text = path.to_string_lossy();
    let mut segments: Vec<String> = Vec::new();
    for segment in text.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s.to_string()),
        }
    }
    segments
}

/// Strip the extension (text after the last `.`) from a file name.
fn file_stem(name: &str) -> Option<&str> {
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    };
    (!stem.is_empty()).then_some(stem)
}

/// Bidirectional mapping between virtual paths and record identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCodec {
    root: String,
    extension: String,
}

impl PathCodec {
    /// Create a codec for a sync root name and a file extension (no dot).
    pub fn new(root: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Name of the sync root directory.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// File extension for record files.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Decode a virtual path.
    pub fn decode(&self, path: &Path) -> SyncPath {
        let segments = normalize(path);
        let Some((first, rest)) = segments.split_first() else {
            return SyncPath::Parent;
        };
        if *first != self.root {
            return SyncPath::Outside;
        }

        match rest {
            [] => SyncPath::Root,
            [bucket] => RecordType::from_str(bucket).map_or(SyncPath::Outside, SyncPath::Bucket),
            [bucket, file] => match (RecordType::from_str(bucket), file_stem(file)) {
                (Some(record_type), _)
                    if record_type.nests_under().is_some_and(|p| p.as_str() == file.as_str()) =>
                {
                    SyncPath::Marker(record_type)
                }
                (Some(record_type), Some(id)) => SyncPath::Record {
                    record_type,
                    id: id.to_string(),
                },
                _ => SyncPath::Outside,
            },
            _ => SyncPath::Outside,
        }
    }

    /// File name for a record id.
    pub fn file_name(&self, id: &str) -> String {
        format!("{}.{}", id, self.extension)
    }

    /// Path of a type bucket, relative to the repository root.
    pub fn bucket_path(&self, record_type: RecordType) -> PathBuf {
        PathBuf::from(&self.root).join(record_type.as_str())
    }

    /// Path of a record file, relative to the repository root.
    pub fn record_path(&self, record_type: RecordType, id: &str) -> PathBuf {
        self.bucket_path(record_type).join(self.file_name(id))
    }
}
