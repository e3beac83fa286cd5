//! VFS error types.
//!
//! Version-control engines branch on one thing: "is this ENOENT?". Every
//! missing-path condition goes through [`VfsError::not_found`] so the shape is
//! identical no matter which operation hit it.

use std::io;
use thiserror::Error;

use crate::codec::CodecError;
use crate::store::StoreError;

/// errno for "no such file or directory".
pub const ENOENT_ERRNO: i32 = -2;

/// Symbolic code for "no such file or directory".
pub const ENOENT: &str = "ENOENT";

/// VFS error type.
#[derive(Debug, Error)]
pub enum VfsError {
    /// File or directory not found.
    #[error("ENOENT: no such file or directory, {syscall} '{path}'")]
    NotFound { syscall: &'static str, path: String },

    /// Path-derived identity disagrees with the written content.
    #[error("record {field} does not match file path [{content_value} != {path_value}]")]
    IdentityMismatch {
        field: &'static str,
        path_value: String,
        content_value: String,
    },

    /// Operation the adapter does not support.
    #[error("{0} not supported")]
    Unsupported(&'static str),

    /// Content could not be encoded or decoded.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// Document store failure.
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl VfsError {
    /// Create a NotFound error for the `scandir` syscall.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::not_found_in("scandir", path)
    }

    /// Create a NotFound error naming the failed syscall.
    pub fn not_found_in(syscall: &'static str, path: impl Into<String>) -> Self {
        Self::NotFound {
            syscall,
            path: path.into(),
        }
    }

    /// Create an IdentityMismatch error.
    pub fn identity_mismatch(
        field: &'static str,
        path_value: impl Into<String>,
        content_value: impl Into<String>,
    ) -> Self {
        Self::IdentityMismatch {
            field,
            path_value: path_value.into(),
            content_value: content_value.into(),
        }
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns true for the not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Symbolic POSIX code, only set for not-found.
    pub fn code(&self) -> Option<&'static str> {
        self.is_not_found().then_some(ENOENT)
    }

    /// Numeric errno, only set for not-found.
    pub fn errno(&self) -> Option<i32> {
        self.is_not_found().then_some(ENOENT_ERRNO)
    }

    /// The syscall that failed, only set for not-found.
    pub fn syscall(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { syscall, .. } => Some(*syscall),
            _ => None,
        }
    }

    /// The offending path, only set for not-found.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound { .. } => io::Error::new(io::ErrorKind::NotFound, e.to_string()),
            VfsError::Unsupported(_) => io::Error::new(io::ErrorKind::Unsupported, e.to_string()),
            VfsError::IdentityMismatch { .. } | VfsError::Codec(_) => {
                io::Error::new(io::ErrorKind::InvalidData, e.to_string())
            }
            VfsError::Store(_) | VfsError::Other(_) => io::Error::other(e.to_string()),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_shape() {
        let err = VfsError::not_found(".insomnia/Request/req_1.json");
        assert_eq!(err.code(), Some("ENOENT"));
        assert_eq!(err.errno(), Some(-2));
        assert_eq!(err.syscall(), Some("scandir"));
        assert_eq!(err.path(), Some(".insomnia/Request/req_1.json"));
        assert_eq!(
            err.to_string(),
            "ENOENT: no such file or directory, scandir '.insomnia/Request/req_1.json'"
        );
    }

    #[test]
    fn test_other_errors_have_no_code() {
        let err = VfsError::Unsupported("symlink");
        assert_eq!(err.code(), None);
        assert_eq!(err.errno(), None);
        assert_eq!(err.to_string(), "symlink not supported");

        let err = VfsError::identity_mismatch("_id", "req_1", "req_2");
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "record _id does not match file path [req_2 != req_1]"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io_err: io::Error = VfsError::not_found_in("stat", "x").into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

        let io_err: io::Error = VfsError::Unsupported("symlink").into();
        assert_eq!(io_err.kind(), io::ErrorKind::Unsupported);
    }
}
