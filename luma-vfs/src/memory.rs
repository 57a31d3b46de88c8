//! In-memory file system

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Files = BTreeMap<String, Vec<u8>>;

/// Scripts held in memory, keyed by root-relative path
///
/// Clones share the same storage, so a host can keep a handle and add or
/// replace scripts after the bridge has taken its own copy. Directories are
/// implicit: a path is a directory when some file lives below it.
///
/// ```
/// use luma_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::with_files([("Scripts/util.lua", b"return 1".to_vec())]);
/// assert!(fs.is_dir(Path::new("Scripts")));
/// assert!(fs.exists(Path::new("/Scripts/util.lua")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<Files>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let files: Files = files
            .into_iter()
            .map(|(path, content)| (key(Path::new(path.as_ref())), content))
            .collect();
        MemoryFileSystem {
            files: Arc::new(RwLock::new(files)),
        }
    }

    /// Returns whether the file existed
    pub fn remove_file(&self, path: &Path) -> bool {
        self.write().remove(&key(path)).is_some()
    }

    /// Stored file paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Files> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Files> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Storage key: `/`-separated, no leading `/`, no `.` segments
fn key(path: &Path) -> String {
    let raw = path.to_string_lossy();
    raw.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let key = key(path);
        match self.read().get(&key) {
            Some(content) => Ok(content.clone()),
            None => Err(VfsError::NotFound { path: key }),
        }
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let key = key(path);
        if key.is_empty() {
            return Err(VfsError::InvalidPath {
                path: path.to_string_lossy().into_owned(),
                reason: "empty file name".to_string(),
            });
        }
        if self.is_dir(path) {
            return Err(VfsError::InvalidPath {
                path: key,
                reason: "a directory already has this name".to_string(),
            });
        }
        self.write().insert(key, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.read().contains_key(&key(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let key = key(path);
        if key.is_empty() {
            return true;
        }
        let prefix = key + "/";
        self.read()
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .next()
            .is_some_and(|(path, _)| path.starts_with(&prefix))
    }
}
