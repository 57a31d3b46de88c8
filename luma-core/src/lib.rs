//! Luma Core - embedded Lua scripting bridge
//!
//! Owns the Lua runtime of a host application and controls what scripts see:
//!
//! - **Lifecycle**: [`ScriptVm`] creates, replaces and destroys the runtime
//! - **Engine module**: a single well-known module (`require 'luma'`) populated
//!   by an ordered [`ModuleRegistry`] of groups plus late [`ExtensionPoint`]
//!   callbacks
//! - **Module resolution**: `require` looks scripts up through a
//!   [`luma_vfs::VirtualFileSystem`] instead of the native disk
//! - **Diagnostics**: every uncaught script fault is classified, logged once and
//!   handed back as an [`Outcome::Faulted`]
//!
//! # Example
//! ```
//! use luma_config::BridgeConfig;
//! use luma_core::{ModuleRegistry, Outcome, ScriptVm};
//! use luma_log::Logger;
//! use luma_vfs::MemoryFileSystem;
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::with_files([("Scripts/util.lua", b"return { answer = 42 }".to_vec())]);
//! let mut vm: ScriptVm = ScriptVm::new(BridgeConfig::default(), Arc::new(fs), Logger::noop()).unwrap();
//! vm.init().unwrap();
//! vm.init_engine_module(Arc::new(()), &ModuleRegistry::new()).unwrap();
//!
//! let answer: i64 = vm.eval("return require('util').answer", "example").unwrap().completed().unwrap();
//! assert_eq!(answer, 42);
//! ```

mod debuggee;
mod error;
mod extension;
mod fault;
mod introspect;
mod module;
mod registry;
mod resolver;
mod vm;

pub mod groups;

pub use debuggee::DebuggeeStatus;
pub use error::{BridgeError, Result};
pub use extension::ExtensionPoint;
pub use fault::{ErrorBridge, FaultKind, Outcome, ScriptFault};
pub use introspect::{JitVersion, RuntimeVersion};
pub use module::{host_context, Module};
pub use registry::{FnGroup, ModuleGroup, ModuleRegistry, CORE_GROUP};
pub use resolver::{ModuleResolver, ResolveError, SearchPath};
pub use vm::ScriptVm;

/// Re-exported so hosts can write bindings without a direct `mlua` dependency
pub use mlua;
