//! VFS errors

use std::fmt;
use std::io;
use std::path::Path;

pub type VfsResult<T> = Result<T, VfsError>;

/// Why a file system operation failed
///
/// Only [`VfsError::NotFound`] means "look elsewhere"; the resolver treats
/// every other variant as a real failure of that location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    NotFound { path: String },
    PermissionDenied { path: String },
    /// The path cannot be mapped, e.g. it climbs out of a base directory
    InvalidPath { path: String, reason: String },
    /// No layer accepts writes
    ReadOnly { path: String },
    Io { message: String },
}

impl VfsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }

    /// The virtual path involved, when the error is about a path
    pub fn path(&self) -> Option<&str> {
        match self {
            VfsError::NotFound { path }
            | VfsError::PermissionDenied { path }
            | VfsError::InvalidPath { path, .. }
            | VfsError::ReadOnly { path } => Some(path),
            VfsError::Io { .. } => None,
        }
    }

    /// Classify an OS error raised while accessing `path`
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let path = path.to_string_lossy().into_owned();
        match err.kind() {
            io::ErrorKind::NotFound => VfsError::NotFound { path },
            io::ErrorKind::PermissionDenied => VfsError::PermissionDenied { path },
            _ => VfsError::Io {
                message: format!("{path}: {err}"),
            },
        }
    }
}

impl fmt::Display for VfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VfsError::NotFound { path } => write!(f, "no such file '{path}'"),
            VfsError::PermissionDenied { path } => write!(f, "access to '{path}' denied"),
            VfsError::InvalidPath { path, reason } => write!(f, "bad path '{path}': {reason}"),
            VfsError::ReadOnly { path } => write!(f, "cannot write '{path}': no writable layer"),
            VfsError::Io { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for VfsError {}
