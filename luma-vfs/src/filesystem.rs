//! The file system seam every script load goes through

use crate::error::VfsResult;
use std::path::Path;

/// Source of script bytes
///
/// Paths are virtual: each implementation decides what a path maps to.
/// Implementations must be shareable across threads since one file system
/// instance backs both the resolver and the host.
pub trait VirtualFileSystem: Send + Sync {
    /// Whole contents of a file; a missing file is [`NotFound`](crate::VfsError::NotFound)
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Create or replace a file
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Like [`read_file`](Self::read_file), with a missing file as `Ok(None)`
    fn load_file(&self, path: &Path) -> VfsResult<Option<Vec<u8>>> {
        match self.read_file(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// File contents as text, invalid UTF-8 replaced
    fn read_text(&self, path: &Path) -> VfsResult<String> {
        let bytes = self.read_file(path)?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}
