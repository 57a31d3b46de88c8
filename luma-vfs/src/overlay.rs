//! Overlay file system: an ordered stack of file systems

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::path::Path;
use std::sync::Arc;

struct Layer {
    fs: Arc<dyn VirtualFileSystem>,
    writable: bool,
}

/// Stack of file systems consulted in priority order.
///
/// The first layer added has the highest priority: reads return the first hit,
/// so a mod or patch layer placed in front shadows the packed game scripts
/// behind it. Writes go to the highest-priority writable layer.
///
/// # Example
/// ```
/// use luma_vfs::{MemoryFileSystem, OverlayFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let patch = MemoryFileSystem::with_files([("util.lua", b"return 2".to_vec())]);
/// let base = MemoryFileSystem::with_files([("util.lua", b"return 1".to_vec())]);
/// let fs = OverlayFileSystem::new().with_layer(patch).with_read_only_layer(base);
/// assert_eq!(fs.read_file(Path::new("util.lua")).unwrap(), b"return 2");
/// ```
#[derive(Default)]
pub struct OverlayFileSystem {
    layers: Vec<Layer>,
}

impl OverlayFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a writable layer below the existing ones
    pub fn with_layer(mut self, fs: impl VirtualFileSystem + 'static) -> Self {
        self.push_layer(Arc::new(fs), true);
        self
    }

    /// Append a read-only layer below the existing ones
    pub fn with_read_only_layer(mut self, fs: impl VirtualFileSystem + 'static) -> Self {
        self.push_layer(Arc::new(fs), false);
        self
    }

    /// Append a shared layer below the existing ones
    pub fn push_layer(&mut self, fs: Arc<dyn VirtualFileSystem>, writable: bool) {
        self.layers.push(Layer { fs, writable });
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl std::fmt::Debug for OverlayFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let writable: Vec<bool> = self.layers.iter().map(|l| l.writable).collect();
        f.debug_struct("OverlayFileSystem")
            .field("layers", &writable)
            .finish()
    }
}

impl VirtualFileSystem for OverlayFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        for layer in &self.layers {
            match layer.fs.read_file(path) {
                Err(VfsError::NotFound { .. }) => continue,
                other => return other,
            }
        }
        Err(VfsError::NotFound {
            path: path.to_string_lossy().to_string(),
        })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        match self.layers.iter().find(|l| l.writable) {
            Some(layer) => layer.fs.write_file(path, content),
            None => Err(VfsError::ReadOnly {
                path: path.to_string_lossy().to_string(),
            }),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.layers.iter().any(|l| l.fs.exists(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.layers.iter().any(|l| l.fs.is_file(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.layers.iter().any(|l| l.fs.is_dir(path))
    }
}
