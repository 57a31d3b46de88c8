//! 模块解析测试
//!
//! require 通过 VFS 查找脚本：根目录优先，然后 Scripts/

mod common;
use common::{error_lines, harness_with_config, ready, GameWorld};
use luma_config::BridgeConfig;
use luma_core::{BridgeError, FaultKind, ModuleRegistry};
use luma_vfs::{MemoryFileSystem, OverlayFileSystem, VirtualFileSystem};
use std::path::Path;
use std::sync::Arc;

// ===== 查找顺序 =====

#[test]
fn test_resolves_from_root() {
    let h = ready(&[("util.lua", "return { where = 'root' }")]);
    let where_: String = h
        .vm
        .eval("return require('util').where", "main")
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(where_, "root");
}

#[test]
fn test_resolves_from_scripts_dir() {
    let h = ready(&[("Scripts/util.lua", "return { where = 'scripts' }")]);
    let where_: String = h
        .vm
        .require_module::<luma_core::mlua::Table>("util")
        .unwrap()
        .completed()
        .unwrap()
        .get("where")
        .unwrap();
    assert_eq!(where_, "scripts");
}

#[test]
fn test_root_shadows_scripts_dir() {
    let h = ready(&[
        ("util.lua", "return 'root'"),
        ("Scripts/util.lua", "return 'scripts'"),
    ]);
    let v: String = h.vm.require_module("util").unwrap().completed().unwrap();
    assert_eq!(v, "root");
}

#[test]
fn test_nested_module_path() {
    let h = ready(&[("Scripts/ai/brain.lua", "return { think = function() return 'hmm' end }")]);
    let v: String = h
        .vm
        .eval("return require('ai/brain').think()", "main")
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(v, "hmm");
}

#[test]
fn test_explicit_extension_is_kept() {
    let h = ready(&[("Scripts/helpers.lua", "return 7")]);
    let v: i64 = h.vm.require_module("helpers.lua").unwrap().completed().unwrap();
    assert_eq!(v, 7);
}

#[test]
fn test_chunk_named_after_logical_name() {
    let h = ready(&[("Scripts/util.lua", "local M = {}\nfunction M.fail() error('boom') end\nreturn M")]);
    let outcome = h.vm.exec("require('util').fail()", "main").unwrap();
    let fault = outcome.fault().unwrap();
    assert_eq!(fault.kind, FaultKind::Runtime);
    assert!(fault.message.contains("util:2: boom"), "{}", fault.message);
    assert!(!fault.message.contains("Scripts/"));
}

#[test]
fn test_module_runs_once() {
    let h = ready(&[("counter.lua", "loads = (loads or 0) + 1\nreturn {}")]);
    assert!(h
        .vm
        .exec("require('counter'); require('counter')", "main")
        .unwrap()
        .is_completed());
    let loads: i64 = h.vm.eval("return loads", "main").unwrap().completed().unwrap();
    assert_eq!(loads, 1);
}

// ===== 找不到 =====

#[test]
fn test_unresolvable_name_faults_without_panic() {
    let h = ready(&[]);
    let outcome = h.vm.exec("require('ghost')", "main").unwrap();
    let fault = outcome.fault().unwrap();

    assert_eq!(fault.kind, FaultKind::Runtime);
    assert!(fault.message.contains("module 'ghost' not found"));
    assert!(fault.message.contains("no file 'ghost.lua' (vfs)"));
    assert!(fault.message.contains("no file 'Scripts/ghost.lua' (vfs)"));
    assert_eq!(error_lines(&h.ring).len(), 1);

    // 运行时仍然可用
    let sum: i64 = h.vm.eval("return 1 + 1", "main").unwrap().completed().unwrap();
    assert_eq!(sum, 2);
}

#[test]
fn test_pcall_require_stays_inside_script() {
    let h = ready(&[]);
    let ok: bool = h
        .vm
        .eval("return (pcall(require, 'ghost'))", "main")
        .unwrap()
        .completed()
        .unwrap();
    assert!(!ok);
    assert!(error_lines(&h.ring).is_empty());
}

#[test]
fn test_syntax_error_in_module() {
    let h = ready(&[("Scripts/broken.lua", "local x = = 1")]);
    let outcome = h.vm.require_module::<()>("broken").unwrap();
    let fault = outcome.fault().unwrap();
    assert_eq!(fault.kind, FaultKind::Syntax);
    assert!(fault.message.starts_with("broken:1:"), "{}", fault.message);

    let errors = error_lines(&h.ring);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("LUA_ERRSYNTAX - broken:1:"));
}

// ===== 文件系统 =====

#[test]
fn test_overlay_layer_shadows_base() {
    let patch = MemoryFileSystem::with_files([("Scripts/balance.lua", b"return 2".to_vec())]);
    let base = MemoryFileSystem::with_files([
        ("Scripts/balance.lua", b"return 1".to_vec()),
        ("Scripts/other.lua", b"return 3".to_vec()),
    ]);
    let fs = OverlayFileSystem::new()
        .with_layer(patch)
        .with_read_only_layer(base);

    let (logger, _) = luma_log::LogConfig::test().init();
    let mut vm = luma_core::ScriptVm::<()>::new(BridgeConfig::default(), Arc::new(fs), logger)
        .unwrap();
    vm.init().unwrap();

    let (balance, other): (i64, i64) = vm
        .eval("return require('balance'), require('other')", "main")
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!((balance, other), (2, 3));
}

#[test]
fn test_files_written_later_are_found() {
    let h = ready(&[]);
    h.fs.write_file(Path::new("Scripts/late.lua"), b"return 'late'")
        .unwrap();
    let v: String = h.vm.require_module("late").unwrap().completed().unwrap();
    assert_eq!(v, "late");
}

#[test]
fn test_exec_file() {
    let h = ready(&[("Scripts/main.lua", "started = require('luma') ~= nil")]);
    assert!(h.vm.exec_file("Scripts/main.lua").unwrap().is_completed());
    let started: bool = h.vm.eval("return started", "check").unwrap().completed().unwrap();
    assert!(started);

    let missing = h.vm.exec_file("Scripts/missing.lua").unwrap_err();
    assert!(matches!(missing, BridgeError::Vfs(e) if e.is_not_found()));
}

#[test]
fn test_text_only_refuses_bytecode() {
    let lua = luma_core::mlua::Lua::new();
    let bytecode = lua
        .load("return 'compiled'")
        .into_function()
        .unwrap()
        .dump(false);

    let h = ready(&[]);
    h.fs.write_file(Path::new("Scripts/bin.lua"), &bytecode).unwrap();
    let outcome = h.vm.require_module::<String>("bin").unwrap();
    assert!(outcome.is_faulted());

    let mut config = BridgeConfig::default();
    config.resolver.text_only = false;
    let mut h = harness_with_config(config, &[]);
    h.fs.write_file(Path::new("Scripts/bin.lua"), &bytecode).unwrap();
    h.vm.init().unwrap();
    h.vm.init_engine_module(GameWorld::new("w"), &ModuleRegistry::new())
        .unwrap();
    let v: String = h.vm.require_module("bin").unwrap().completed().unwrap();
    assert_eq!(v, "compiled");
}

#[test]
fn test_custom_search_path() {
    let mut config = BridgeConfig::default();
    config.resolver.search_paths = vec!["Mods/{name}".to_string(), "{name}".to_string()];
    let mut h = harness_with_config(
        config,
        &[("Mods/util.lua", "return 'mod'"), ("util.lua", "return 'base'")],
    );
    h.vm.init().unwrap();
    let v: String = h.vm.require_module("util").unwrap().completed().unwrap();
    assert_eq!(v, "mod");
}
