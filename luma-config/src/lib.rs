//! Luma Config - configuration data structures
//!
//! This crate holds the shared configuration vocabulary across all Luma crates:
//! the bridge settings read from project files, and the variable store the host
//! uses for persisted (archived) settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod vars;

pub use vars::{VarDef, VarFlags, VarRegistry, VarStore, DEBUGGER_ADDR_VAR};

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("module name must not be empty")]
    EmptyModuleName,

    #[error("search path template '{0}' does not contain '{{name}}'")]
    MissingNamePlaceholder(String),

    #[error("resolver needs at least one search path")]
    NoSearchPaths,

    #[error("units_per_meter must be a positive finite number (got {0})")]
    InvalidUnitScale(f64),

    #[error("variable '{0}' is not registered")]
    UnknownVar(String),

    #[error("failed to parse variable archive: {0}")]
    Archive(String),
}

/// Log verbosity as written in project files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Top-level bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name the engine module is registered under (`require '<name>'`)
    pub module_name: String,
    /// Whether the JIT compiler starts enabled
    pub jit: bool,
    /// Module resolution settings
    pub resolver: ResolverConfig,
    /// Unit conversion settings exposed to scripts
    pub units: UnitConfig,
    /// Remote debugger settings
    pub debugger: DebuggerConfig,
}

/// Module resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Ordered path templates; `{name}` is replaced by the module file name
    pub search_paths: Vec<String>,
    /// Extension appended when a module name has none (without the dot)
    pub default_extension: String,
    /// Refuse precompiled bytecode chunks
    pub text_only: bool,
}

/// Unit conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// How many world units make up one meter
    pub units_per_meter: f64,
}

/// Remote debugger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerConfig {
    /// Debuggee attachment is off unless explicitly enabled
    pub enabled: bool,
    /// Socket transport module required before the protocol module
    pub transport_module: String,
    /// JSON codec handed to the debugger protocol
    pub json_module: String,
    /// Debugger protocol module (must expose `start(json, config)` and `poll()`)
    pub protocol_module: String,
    /// Route `print` through the debugger connection
    pub redirect_print: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module_name: "luma".to_string(),
            jit: true,
            resolver: ResolverConfig::default(),
            units: UnitConfig::default(),
            debugger: DebuggerConfig::default(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_paths: vec!["{name}".to_string(), "Scripts/{name}".to_string()],
            default_extension: "lua".to_string(),
            text_only: true,
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        // one unit is one centimeter
        Self {
            units_per_meter: 100.0,
        }
    }
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            transport_module: "socket.core".to_string(),
            json_module: "dkjson".to_string(),
            protocol_module: "vscode-debuggee".to_string(),
            redirect_print: true,
        }
    }
}

impl BridgeConfig {
    /// Check the invariants the bridge relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::EmptyModuleName);
        }
        self.resolver.validate()?;
        self.units.validate()
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_paths.is_empty() {
            return Err(ConfigError::NoSearchPaths);
        }
        if let Some(bad) = self.search_paths.iter().find(|t| !t.contains("{name}")) {
            return Err(ConfigError::MissingNamePlaceholder(bad.clone()));
        }
        Ok(())
    }
}

impl UnitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.units_per_meter.is_finite() || self.units_per_meter <= 0.0 {
            return Err(ConfigError::InvalidUnitScale(self.units_per_meter));
        }
        Ok(())
    }
}
