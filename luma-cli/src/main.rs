//! Luma CLI - Command line runner
//!
//! Project-based execution - all configuration from luma.json

use clap::Parser;
use luma_core::groups::MathGroup;
use luma_core::{host_context, BridgeError, ModuleRegistry, Outcome, ScriptVm};
use luma_log::{info, Logger};
use luma_vfs::{NativeFileSystem, VirtualFileSystem};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

mod config;
mod logging;
mod platform;

use crate::config::ProjectFile;
use crate::platform::{print_fault_with_source, print_versions};

#[derive(Parser)]
#[command(
    name = "luma",
    about = "Luma scripting bridge - Project-based execution",
    version
)]
struct Cli {
    /// Project file path (default: ./luma.json)
    #[arg(value_name = "PROJECT", default_value = "luma.json")]
    project: PathBuf,

    /// Print runtime and JIT versions, then exit
    #[arg(long)]
    versions: bool,

    /// Start with the JIT compiler disabled
    #[arg(long)]
    no_jit: bool,
}

/// 脚本可见的宿主上下文
#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub root: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let project = match ProjectFile::read(&cli.project) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let logger = logging::init(project.log_level, project.log_format);

    match run(&cli, &project, &logger) {
        Ok(Outcome::Completed(())) => {}
        Ok(Outcome::Faulted(_)) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// 初始化脚本桥并执行入口脚本
///
/// 脚本错误已由桥记录，这里只负责带源码上下文打印。
fn run(cli: &Cli, project: &ProjectFile, logger: &Arc<Logger>) -> Result<Outcome<()>, String> {
    let root = project.script_root(&cli.project);
    let vfs = Arc::new(NativeFileSystem::with_base(&root));
    let vars = Arc::new(project.var_registry()?);

    let mut bridge_config = project.bridge.clone();
    if cli.no_jit {
        bridge_config.jit = false;
    }

    let mut vm = ScriptVm::<Project>::new(bridge_config, vfs.clone(), Arc::clone(logger))
        .map_err(|e| e.to_string())?
        .with_var_store(vars);
    let context = Arc::new(Project {
        name: project.display_name(&cli.project),
        root,
    });

    let outcome = start(&mut vm, context).and_then(|()| {
        if cli.versions {
            report_versions(&vm)?;
            return Ok(Outcome::Completed(()));
        }
        execute(&vm, vfs.as_ref(), &project.entry)
    });

    vm.shutdown();
    outcome.map_err(|e| e.to_string())
}

fn start(vm: &mut ScriptVm<Project>, context: Arc<Project>) -> Result<(), BridgeError> {
    vm.register_extension(|module, project| {
        module.constant("project_name", project.name.as_str())?;
        module.function("project_root", |lua, ()| {
            Ok(host_context::<Project>(lua).map(|p| p.root.display().to_string()))
        })
    })?;

    vm.init()?;
    vm.init_engine_module(context, &ModuleRegistry::new().with(MathGroup))?;
    vm.start_debuggee()?;
    Ok(())
}

fn report_versions(vm: &ScriptVm<Project>) -> Result<(), BridgeError> {
    let runtime = vm.runtime_version()?;
    let jit = match vm.jit_version() {
        Ok(jit) => Some(jit),
        Err(BridgeError::JitUnavailable) => None,
        Err(e) => return Err(e),
    };
    print_versions(&runtime, jit.as_ref());
    Ok(())
}

fn execute(
    vm: &ScriptVm<Project>,
    vfs: &dyn VirtualFileSystem,
    entry: &str,
) -> Result<Outcome<()>, BridgeError> {
    info!(vm.logger(), "running '{}'", entry);
    let outcome = vm.exec_file(entry)?;
    vm.poll_debuggee()?;

    if let Some(fault) = outcome.fault() {
        let source = vfs.read_text(Path::new(entry)).unwrap_or_default();
        print_fault_with_source(fault, entry, &source);
    }
    Ok(outcome)
}
