//! Host-side bridge errors
//!
//! Script faults are not errors here: they are absorbed by the
//! [`ErrorBridge`](crate::ErrorBridge) and returned as
//! [`Outcome::Faulted`](crate::Outcome). `BridgeError` covers everything that
//! goes wrong on the host side of the bridge.

use luma_config::ConfigError;
use luma_vfs::VfsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{operation} requires an initialized script runtime")]
    NotInitialized { operation: &'static str },

    #[error("engine module '{0}' is already installed in this runtime")]
    ModuleAlreadyInstalled(String),

    #[error("extension point is sealed: the engine module has already been installed")]
    ExtensionPointSealed,

    #[error("module group '{group}' requires '{missing}' to be registered before it")]
    GroupOrder { group: String, missing: String },

    #[error("module group '{0}' is registered twice")]
    DuplicateGroup(String),

    #[error("failed to populate '{group}': {source}")]
    Registration {
        group: String,
        #[source]
        source: mlua::Error,
    },

    #[error("script runtime error: {0}")]
    Runtime(#[from] mlua::Error),

    #[error("JIT compiler is not available in this runtime")]
    JitUnavailable,

    #[error("unrecognized runtime version '{0}'")]
    UnrecognizedVersion(String),

    #[error("file system error: {0}")]
    Vfs(#[from] VfsError),

    #[error("invalid bridge configuration: {0}")]
    Config(#[from] ConfigError),
}

impl BridgeError {
    /// Lifecycle misuse: the operation needs a live runtime
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, BridgeError::NotInitialized { .. })
    }
}
