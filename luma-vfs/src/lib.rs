//! Luma virtual file system
//!
//! Scripts do not have to live on the native disk: they may be packed,
//! generated in memory or overridden by a mod layer. Everything that loads
//! scripts goes through [`VirtualFileSystem`].
//!
//! ```
//! use luma_vfs::{MemoryFileSystem, OverlayFileSystem, VirtualFileSystem};
//! use std::path::Path;
//!
//! let game = MemoryFileSystem::with_files([("Scripts/util.lua", b"return 1".to_vec())]);
//! let mods = MemoryFileSystem::new();
//! let fs = OverlayFileSystem::new().with_layer(mods.clone()).with_read_only_layer(game);
//!
//! mods.write_file(Path::new("Scripts/util.lua"), b"return 2").unwrap();
//! assert_eq!(fs.read_text(Path::new("Scripts/util.lua")).unwrap(), "return 2");
//! ```

mod error;
mod filesystem;
mod memory;
mod native;
mod overlay;

pub use error::{VfsError, VfsResult};
pub use filesystem::VirtualFileSystem;
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use overlay::OverlayFileSystem;
