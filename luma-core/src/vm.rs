//! Runtime lifecycle manager

use crate::debuggee::{self, DebuggeeStatus, BOOTSTRAP_CHUNK};
use crate::error::{BridgeError, Result};
use crate::extension::ExtensionPoint;
use crate::fault::{ErrorBridge, Outcome};
use crate::groups::CoreGroup;
use crate::introspect::{self, JitControl, JitVersion, RuntimeVersion};
use crate::module::Module;
use crate::registry::{ModuleGroup, ModuleRegistry};
use crate::resolver::ModuleResolver;
use luma_config::{BridgeConfig, VarRegistry, VarStore, DEBUGGER_ADDR_VAR};
use luma_log::{debug, info, warn, Logger};
use luma_vfs::VirtualFileSystem;
use mlua::{
    ChunkMode, FromLuaMulti, Function, IntoLua, Lua, LuaOptions, MaybeSend, StdLib, Table,
};
use std::path::Path;
use std::sync::Arc;

/// One live runtime and everything tied to its lifetime
///
/// Versions and library handles are captured in `init` before any script
/// runs; scripts rebinding `_VERSION`, `jit`, `package` or `require` do not
/// affect the bridge.
struct Runtime<C> {
    lua: Lua,
    bridge: ErrorBridge,
    version: RuntimeVersion,
    jit: Option<JitControl>,
    require: Function,
    loaded: Table,
    preload: Table,
    context: Option<Arc<C>>,
    module_installed: bool,
    debuggee: DebuggeeStatus,
}

/// Owner of the embedded Lua runtime
///
/// At most one runtime is live at a time. `init` creates it (replacing a
/// previous one), `init_engine_module` installs the engine module, `shutdown`
/// destroys it. Every operation that needs a runtime returns
/// [`BridgeError::NotInitialized`] when none is live.
///
/// `C` is the host context handed to module groups, shared with the host.
pub struct ScriptVm<C = ()> {
    config: BridgeConfig,
    vfs: Arc<dyn VirtualFileSystem>,
    logger: Arc<Logger>,
    vars: Arc<dyn VarStore>,
    extensions: ExtensionPoint<C>,
    runtime: Option<Runtime<C>>,
}

impl<C> std::fmt::Debug for ScriptVm<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptVm")
            .field("module_name", &self.config.module_name)
            .field("initialized", &self.runtime.is_some())
            .field(
                "module_installed",
                &self.runtime.as_ref().is_some_and(|rt| rt.module_installed),
            )
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl<C: 'static> ScriptVm<C> {
    /// Create the manager; no runtime exists until [`init`](Self::init)
    pub fn new(
        config: BridgeConfig,
        vfs: Arc<dyn VirtualFileSystem>,
        logger: Arc<Logger>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(ScriptVm {
            config,
            vfs,
            logger,
            vars: Arc::new(VarRegistry::with_bridge_vars()),
            extensions: ExtensionPoint::new(),
            runtime: None,
        })
    }

    /// Read host variables (debugger address) from `vars`
    pub fn with_var_store(mut self, vars: Arc<dyn VarStore>) -> Self {
        self.vars = vars;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn is_initialized(&self) -> bool {
        self.runtime.is_some()
    }

    pub fn is_module_installed(&self) -> bool {
        self.runtime.as_ref().is_some_and(|rt| rt.module_installed)
    }

    /// The live runtime, for hosts that need direct access
    pub fn lua(&self) -> Option<&Lua> {
        self.runtime.as_ref().map(|rt| &rt.lua)
    }

    /// Host context stored by `init_engine_module`
    pub fn context(&self) -> Option<&Arc<C>> {
        self.runtime.as_ref().and_then(|rt| rt.context.as_ref())
    }

    /// Faults absorbed by the current runtime
    pub fn fault_count(&self) -> u64 {
        self.runtime.as_ref().map_or(0, |rt| rt.bridge.fault_count())
    }

    fn runtime(&self, operation: &'static str) -> Result<&Runtime<C>> {
        self.runtime
            .as_ref()
            .ok_or(BridgeError::NotInitialized { operation })
    }

    /// Create a fresh runtime, shutting down a live one first
    ///
    /// Loads the safe standard libraries (including `jit`), applies the
    /// configured JIT state and installs the VFS module searcher. The engine
    /// module is not installed here.
    pub fn init(&mut self) -> Result<()> {
        if self.runtime.is_some() {
            self.shutdown();
        }

        let lua = Lua::new_with(StdLib::ALL_SAFE, LuaOptions::default())?;
        ModuleResolver::new(
            &self.config.resolver,
            Arc::clone(&self.vfs),
            Arc::clone(&self.logger),
        )
        .install(&lua)?;

        let version = introspect::runtime_version(&lua)?;
        let jit = JitControl::capture(&lua)?;
        match &jit {
            Some(jit) if !self.config.jit => {
                jit.set_enabled(false)?;
                debug!(self.logger, "JIT compiler disabled by configuration");
            }
            None if !self.config.jit => {
                debug!(self.logger, "runtime has no JIT compiler to disable")
            }
            _ => {}
        }

        let require: Function = lua.globals().get("require")?;
        let package: Table = lua.globals().get("package")?;
        let loaded: Table = package.get("loaded")?;
        let preload: Table = package.get("preload")?;

        self.runtime = Some(Runtime {
            lua,
            bridge: ErrorBridge::new(Arc::clone(&self.logger)),
            version,
            jit,
            require,
            loaded,
            preload,
            context: None,
            module_installed: false,
            debuggee: DebuggeeStatus::Disabled,
        });
        info!(self.logger, "script runtime initialized (Lua {})", version);
        Ok(())
    }

    /// Install the engine module and store the host context
    ///
    /// Population order: core bindings, registry groups in order, then every
    /// extension in append order. Afterwards the extension point is sealed
    /// until `shutdown`. If any step fails nothing is published and the
    /// context is not stored.
    pub fn init_engine_module(
        &mut self,
        context: Arc<C>,
        registry: &ModuleRegistry<C>,
    ) -> Result<()> {
        let ScriptVm {
            config,
            logger,
            extensions,
            runtime,
            ..
        } = self;
        let runtime = runtime.as_mut().ok_or(BridgeError::NotInitialized {
            operation: "init_engine_module",
        })?;
        if runtime.module_installed {
            return Err(BridgeError::ModuleAlreadyInstalled(config.module_name.clone()));
        }
        registry.validate()?;

        let _span = logger.enter_span("init_engine_module");
        let mut module = Module::new(&runtime.lua, &config.module_name, logger)?;

        let core = CoreGroup::new(Arc::clone(logger), &config.units);
        populate_group(&core, &mut module, &context)?;
        for group in registry.iter() {
            populate_group(group, &mut module, &context)?;
        }
        extensions.run(&mut module, &context)?;

        let binding_count = module.bindings().len();
        runtime
            .loaded
            .set(config.module_name.as_str(), module.into_table())?;

        runtime.lua.set_app_data(Arc::clone(&context));
        runtime.context = Some(context);
        extensions.seal();
        runtime.module_installed = true;
        info!(
            logger,
            "engine module '{}' installed: {} groups, {} extensions, {} bindings",
            config.module_name,
            registry.len() + 1,
            extensions.len(),
            binding_count
        );
        Ok(())
    }

    /// Clear the extension point and destroy the runtime
    pub fn shutdown(&mut self) {
        self.extensions.clear();
        if self.runtime.take().is_some() {
            info!(self.logger, "script runtime shut down");
        }
    }

    /// Append an extension callback
    ///
    /// Fails with [`BridgeError::ExtensionPointSealed`] once the engine module
    /// is installed; callbacks are never run retroactively.
    pub fn register_extension<F>(&mut self, callback: F) -> Result<()>
    where
        F: Fn(&mut Module<'_>, &Arc<C>) -> mlua::Result<()> + 'static,
    {
        self.extensions.register(callback)?;
        debug!(self.logger, "extension #{} registered", self.extensions.len() - 1);
        Ok(())
    }

    /// Switch the JIT compiler on or off
    ///
    /// A failure inside the runtime is reported to the error bridge before
    /// it is returned.
    pub fn enable_jit(&self, enabled: bool) -> Result<()> {
        let runtime = self.runtime("enable_jit")?;
        let jit = runtime.jit.as_ref().ok_or(BridgeError::JitUnavailable)?;
        if let Err(err) = jit.set_enabled(enabled) {
            runtime.bridge.report(err.clone());
            return Err(err.into());
        }
        debug!(
            self.logger,
            "JIT compiler {}",
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    pub fn is_jit_enabled(&self) -> Result<bool> {
        let runtime = self.runtime("is_jit_enabled")?;
        let jit = runtime.jit.as_ref().ok_or(BridgeError::JitUnavailable)?;
        jit.is_enabled().map_err(|err| {
            runtime.bridge.report(err.clone());
            err.into()
        })
    }

    /// Version of the runtime as created by `init`
    pub fn runtime_version(&self) -> Result<RuntimeVersion> {
        Ok(self.runtime("runtime_version")?.version)
    }

    pub fn jit_version(&self) -> Result<JitVersion> {
        let runtime = self.runtime("jit_version")?;
        runtime
            .jit
            .as_ref()
            .map(JitControl::version)
            .ok_or(BridgeError::JitUnavailable)
    }

    /// Run a chunk, absorbing faults
    pub fn exec(&self, source: &str, chunk_name: &str) -> Result<Outcome<()>> {
        let runtime = self.runtime("exec")?;
        let result = runtime
            .lua
            .load(source)
            .set_name(format!("={chunk_name}"))
            .exec();
        Ok(runtime.bridge.absorb(result))
    }

    /// Evaluate a chunk and convert its results, absorbing faults
    pub fn eval<R: FromLuaMulti>(&self, source: &str, chunk_name: &str) -> Result<Outcome<R>> {
        let runtime = self.runtime("eval")?;
        let result = runtime
            .lua
            .load(source)
            .set_name(format!("={chunk_name}"))
            .eval::<R>();
        Ok(runtime.bridge.absorb(result))
    }

    /// Load a script from the VFS and run it, absorbing faults
    ///
    /// A missing or unreadable file is a host error, not a script fault.
    pub fn exec_file(&self, path: &str) -> Result<Outcome<()>> {
        let runtime = self.runtime("exec_file")?;
        let source = self.vfs.read_file(Path::new(path))?;
        let chunk = runtime.lua.load(source).set_name(format!("={path}"));
        let chunk = if self.config.resolver.text_only {
            chunk.set_mode(ChunkMode::Text)
        } else {
            chunk
        };
        Ok(runtime.bridge.absorb(chunk.exec()))
    }

    /// `require` a module, absorbing faults
    pub fn require_module<R: FromLuaMulti>(&self, name: &str) -> Result<Outcome<R>> {
        let runtime = self.runtime("require_module")?;
        Ok(runtime.bridge.absorb(runtime.require.call::<R>(name)))
    }

    /// Provide a module through `package.preload`
    ///
    /// Preloaded modules take precedence over the VFS searcher.
    pub fn register_preload<F, R>(&self, name: &str, loader: F) -> Result<()>
    where
        F: Fn(&Lua) -> mlua::Result<R> + MaybeSend + 'static,
        R: IntoLua,
    {
        let runtime = self.runtime("register_preload")?;
        let lua = &runtime.lua;
        let loader = lua.create_function(move |lua, _: mlua::MultiValue| loader(lua))?;
        runtime.preload.set(name, loader)?;
        debug!(self.logger, "module '{}' registered in package.preload", name);
        Ok(())
    }

    /// Start the remote debugger session
    ///
    /// Disabled unless `debugger.enabled` is set. Connection failures are
    /// logged and reported as [`DebuggeeStatus::Failed`], never as errors.
    pub fn start_debuggee(&mut self) -> Result<DebuggeeStatus> {
        let runtime = self.runtime.as_mut().ok_or(BridgeError::NotInitialized {
            operation: "start_debuggee",
        })?;
        let debugger = &self.config.debugger;
        if !debugger.enabled {
            debug!(self.logger, "debuggee disabled by configuration");
            runtime.debuggee = DebuggeeStatus::Disabled;
            return Ok(DebuggeeStatus::Disabled);
        }

        let address = self
            .vars
            .get_string(DEBUGGER_ADDR_VAR)
            .unwrap_or_else(|| "localhost".to_string());
        let script = debuggee::bootstrap_script(&self.config.module_name, debugger, &address);
        let result = runtime
            .lua
            .load(script.as_str())
            .set_name(format!("={BOOTSTRAP_CHUNK}"))
            .eval::<bool>();

        let status = match runtime.bridge.absorb(result) {
            Outcome::Completed(true) => {
                info!(self.logger, "debuggee connected to {}", address);
                DebuggeeStatus::Connected
            }
            Outcome::Completed(false) => {
                warn!(self.logger, "no debugger answered at {}", address);
                DebuggeeStatus::Failed
            }
            Outcome::Faulted(_) => {
                warn!(self.logger, "debuggee bootstrap failed");
                DebuggeeStatus::Failed
            }
        };
        runtime.debuggee = status;
        Ok(status)
    }

    /// Status of the debugger session of the live runtime
    pub fn debuggee_status(&self) -> DebuggeeStatus {
        self.runtime
            .as_ref()
            .map_or(DebuggeeStatus::Disabled, |rt| rt.debuggee)
    }

    /// Let the debugger protocol process pending messages
    ///
    /// No-op unless a session is connected.
    pub fn poll_debuggee(&self) -> Result<Outcome<()>> {
        let runtime = self.runtime("poll_debuggee")?;
        if runtime.debuggee != DebuggeeStatus::Connected {
            return Ok(Outcome::Completed(()));
        }
        let script = debuggee::poll_script(&self.config.debugger);
        let result = runtime
            .lua
            .load(script.as_str())
            .set_name(format!("={BOOTSTRAP_CHUNK}"))
            .exec();
        Ok(runtime.bridge.absorb(result))
    }
}

fn populate_group<C: 'static>(
    group: &dyn ModuleGroup<C>,
    module: &mut Module<'_>,
    context: &Arc<C>,
) -> Result<()> {
    group
        .populate(module, context)
        .map_err(|source| BridgeError::Registration {
            group: group.name().to_string(),
            source,
        })
}
