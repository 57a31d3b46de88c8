//! Native file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::path::{Component, Path, PathBuf};

/// A native OS file system implementation.
///
/// Without a base directory paths are used as given. With a base directory,
/// every path is treated as relative to it (a leading `/` is ignored) and
/// paths climbing out of it with `..` are rejected.
///
/// # Example
/// ```
/// use luma_vfs::{NativeFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = NativeFileSystem::with_base(std::env::temp_dir());
/// assert!(!fs.exists(Path::new("../outside")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NativeFileSystem {
    base: Option<PathBuf>,
}

impl NativeFileSystem {
    /// Create a new native file system using paths as given.
    pub fn new() -> Self {
        Self { base: None }
    }

    /// Create a new native file system rooted at `base`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Map a virtual path to the native path it stands for.
    fn resolve(&self, path: &Path) -> VfsResult<PathBuf> {
        let Some(base) = &self.base else {
            return Ok(path.to_path_buf());
        };

        let mut resolved = base.clone();
        for component in path.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    return Err(VfsError::InvalidPath {
                        path: path.to_string_lossy().to_string(),
                        reason: "path escapes the base directory".to_string(),
                    })
                }
            }
        }
        Ok(resolved)
    }
}

impl VirtualFileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let native = self.resolve(path)?;
        std::fs::read(&native).map_err(|e| VfsError::from_io(e, path))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let native = self.resolve(path)?;
        if let Some(parent) = native.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| VfsError::from_io(e, path))?;
        }
        std::fs::write(&native, content).map_err(|e| VfsError::from_io(e, path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|p| p.exists())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("luma_vfs_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_native_read_write_under_base() {
        let root = temp_root("rw");
        let fs = NativeFileSystem::with_base(&root);

        fs.write_file(Path::new("Scripts/util.lua"), b"return 1").unwrap();
        assert!(root.join("Scripts").join("util.lua").is_file());
        assert_eq!(fs.read_file(Path::new("/Scripts/util.lua")).unwrap(), b"return 1");
        assert!(fs.is_dir(Path::new("Scripts")));
        assert!(fs.is_file(Path::new("Scripts/util.lua")));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_native_rejects_parent_escape() {
        let root = temp_root("escape");
        let fs = NativeFileSystem::with_base(&root);

        let result = fs.read_file(Path::new("../secret.lua"));
        assert!(matches!(result, Err(VfsError::InvalidPath { .. })));
        assert!(!fs.exists(Path::new("../secret.lua")));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_native_read_nonexistent() {
        let root = temp_root("missing");
        let fs = NativeFileSystem::with_base(&root);

        let result = fs.read_file(Path::new("nope.lua"));
        assert!(matches!(result, Err(VfsError::NotFound { .. })));
        assert_eq!(fs.load_file(Path::new("nope.lua")).unwrap(), None);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_native_without_base_uses_path_as_given() {
        let root = temp_root("plain");
        let file = root.join("plain.lua");
        let fs = NativeFileSystem::new();

        fs.write_file(&file, b"x").unwrap();
        assert!(fs.is_file(&file));
        assert!(!fs.is_dir(&file));
        assert!(fs.is_dir(&root));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
