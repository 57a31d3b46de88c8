//! VFS-backed module resolution
//!
//! `require` consults a searcher installed right after the preload searcher.
//! The searcher maps a logical module name onto candidate files, loads the
//! first one present in the virtual file system and returns the compiled
//! chunk. When nothing matches it reports the files it tried and lets the
//! remaining searchers run.

use luma_config::ResolverConfig;
use luma_log::{debug, trace, warn, Logger};
use luma_vfs::{VfsError, VirtualFileSystem};
use mlua::{ChunkMode, Function, Lua, Table, Value};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Resolution failure for one logical name
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("module '{name}' not found (tried {})", .tried.join(", "))]
    NotFound { name: String, tried: Vec<String> },
}

impl ResolveError {
    /// Message fragment returned to `require`, one line per tried file
    pub fn searcher_message(&self) -> String {
        match self {
            ResolveError::NotFound { tried, .. } => tried
                .iter()
                .map(|path| format!("\n\tno file '{path}' (vfs)"))
                .collect(),
        }
    }
}

/// Ordered path templates plus the default extension
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    templates: Vec<String>,
    default_extension: String,
}

impl SearchPath {
    pub fn new(templates: Vec<String>, default_extension: impl Into<String>) -> Self {
        SearchPath {
            templates,
            default_extension: default_extension.into(),
        }
    }

    /// File name for a logical name: the name itself when it already has an
    /// extension (a `.` after the last `/`), otherwise name plus the default
    pub fn file_name(&self, name: &str) -> String {
        let last_segment = name.rsplit('/').next().unwrap_or(name);
        if last_segment.contains('.') || self.default_extension.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{}", self.default_extension)
        }
    }

    /// Candidate paths, in lookup order
    pub fn candidates(&self, name: &str) -> Vec<String> {
        let file_name = self.file_name(name);
        self.templates
            .iter()
            .map(|template| template.replace("{name}", &file_name))
            .collect()
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        SearchPath::from(&ResolverConfig::default())
    }
}

impl From<&ResolverConfig> for SearchPath {
    fn from(config: &ResolverConfig) -> Self {
        SearchPath::new(config.search_paths.clone(), config.default_extension.clone())
    }
}

/// Source located for a logical name
#[derive(Debug)]
pub struct ResolvedModule {
    pub name: String,
    pub path: String,
    pub source: Vec<u8>,
}

/// Maps `require` names onto VFS files
#[derive(Clone)]
pub struct ModuleResolver {
    search_path: SearchPath,
    text_only: bool,
    vfs: Arc<dyn VirtualFileSystem>,
    logger: Arc<Logger>,
}

impl std::fmt::Debug for ModuleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleResolver")
            .field("search_path", &self.search_path)
            .field("text_only", &self.text_only)
            .finish()
    }
}

impl ModuleResolver {
    pub fn new(
        config: &ResolverConfig,
        vfs: Arc<dyn VirtualFileSystem>,
        logger: Arc<Logger>,
    ) -> Self {
        ModuleResolver {
            search_path: SearchPath::from(config),
            text_only: config.text_only,
            vfs,
            logger,
        }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Find the first candidate present in the VFS
    ///
    /// Failures other than "not found" are logged and the next candidate is
    /// tried.
    pub fn resolve(&self, name: &str) -> Result<ResolvedModule, ResolveError> {
        let candidates = self.search_path.candidates(name);
        for path in &candidates {
            match self.vfs.read_file(Path::new(path)) {
                Ok(source) => {
                    debug!(self.logger, "resolved module '{}' from '{}'", name, path);
                    return Ok(ResolvedModule {
                        name: name.to_string(),
                        path: path.clone(),
                        source,
                    });
                }
                Err(VfsError::NotFound { .. }) => {
                    trace!(self.logger, "module '{}': no file '{}'", name, path);
                }
                Err(e) => {
                    warn!(self.logger, "module '{}': cannot read '{}': {}", name, path, e);
                }
            }
        }
        Err(ResolveError::NotFound {
            name: name.to_string(),
            tried: candidates,
        })
    }

    /// Compile a resolved module; the chunk is named after the logical name
    pub fn compile(&self, lua: &Lua, module: ResolvedModule) -> mlua::Result<Function> {
        let chunk = lua.load(module.source).set_name(format!("={}", module.name));
        let chunk = if self.text_only {
            chunk.set_mode(ChunkMode::Text)
        } else {
            chunk
        };
        chunk.into_function()
    }

    /// Insert the searcher into `package.searchers` (or `package.loaders` on
    /// Lua 5.1 / LuaJIT) directly after the preload searcher
    pub fn install(&self, lua: &Lua) -> mlua::Result<()> {
        let package: Table = lua.globals().get("package")?;
        let searchers = match package.get::<Option<Table>>("searchers")? {
            Some(searchers) => searchers,
            None => package.get::<Table>("loaders")?,
        };

        let resolver = self.clone();
        let searcher = lua.create_function(move |lua, name: String| {
            match resolver.resolve(&name) {
                Ok(module) => resolver.compile(lua, module).map(Value::Function),
                Err(e) => lua.create_string(e.searcher_message()).map(Value::String),
            }
        })?;

        let position = searchers.raw_len().min(1) + 1;
        searchers.raw_insert(position as mlua::Integer, searcher)?;
        debug!(
            self.logger,
            "module searcher installed at position {} ({} templates)",
            position,
            self.search_path.templates.len()
        );
        Ok(())
    }
}
