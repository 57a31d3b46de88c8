//! 版本与 JIT 查询测试

mod common;
use common::{error_lines, harness, harness_with_config, ready, GameWorld};
use luma_config::BridgeConfig;
use luma_core::mlua::Table;
use luma_core::ModuleRegistry;

#[test]
fn test_runtime_version_is_major_minor() {
    let h = ready(&[]);
    let version = h.vm.runtime_version().unwrap();
    assert_eq!(version.to_string(), "5.1");
}

#[test]
fn test_jit_version_format() {
    let h = ready(&[]);
    let version = h.vm.jit_version().unwrap();
    assert_eq!(version.major, 2);

    let text = version.to_string();
    assert_eq!(text.split('.').count(), 3);
    assert!(text.starts_with("2."));
}

#[test]
fn test_disabling_jit_keeps_version() {
    let h = ready(&[]);
    let before = h.vm.jit_version().unwrap();

    h.vm.enable_jit(false).unwrap();
    assert!(!h.vm.is_jit_enabled().unwrap());
    assert_eq!(h.vm.jit_version().unwrap(), before);

    h.vm.enable_jit(true).unwrap();
    assert!(h.vm.is_jit_enabled().unwrap());
}

#[test]
fn test_config_can_start_with_jit_off() {
    let config = BridgeConfig {
        jit: false,
        ..BridgeConfig::default()
    };
    let mut h = harness_with_config(config, &[]);
    h.vm.init().unwrap();
    assert!(!h.vm.is_jit_enabled().unwrap());
}

#[test]
fn test_scripts_cannot_rebind_runtime_info() {
    let h = ready(&[]);
    let runtime = h.vm.runtime_version().unwrap();
    let jit = h.vm.jit_version().unwrap();

    let outcome = h
        .vm
        .exec(
            "_VERSION = 'nope'\n\
             jit = { version_num = 90909,\n\
                     on = function() error('hijacked') end,\n\
                     off = function() error('hijacked') end,\n\
                     status = function() return 'yes' end }",
            "main",
        )
        .unwrap();
    assert!(outcome.is_completed());

    assert_eq!(h.vm.runtime_version().unwrap(), runtime);
    assert_eq!(h.vm.jit_version().unwrap(), jit);

    h.vm.enable_jit(false).unwrap();
    assert!(!h.vm.is_jit_enabled().unwrap());
    h.vm.enable_jit(true).unwrap();
    assert!(h.vm.is_jit_enabled().unwrap());
    assert_eq!(h.vm.fault_count(), 0);
    assert!(error_lines(&h.ring).is_empty());
}

#[test]
fn test_scripts_cannot_rebind_package() {
    let mut h = harness(&[("Scripts/util.lua", "return { answer = 42 }")]);
    h.vm.init().unwrap();
    assert!(h.vm.exec("package = nil; require = nil", "main").unwrap().is_completed());

    h.vm.init_engine_module(GameWorld::new("w"), &ModuleRegistry::new())
        .unwrap();
    h.vm.register_preload("config", |lua| lua.create_table()).unwrap();

    let luma: Table = h.vm.require_module("luma").unwrap().completed().unwrap();
    assert!(luma.contains_key("unit_to_meter").unwrap());
    let util: Table = h.vm.require_module("util").unwrap().completed().unwrap();
    assert_eq!(util.get::<i64>("answer").unwrap(), 42);
    assert!(h.vm.require_module::<Table>("config").unwrap().is_completed());
}

#[test]
fn test_introspection_requires_runtime() {
    let h = harness(&[]);
    assert!(h.vm.runtime_version().unwrap_err().is_not_initialized());
    assert!(h.vm.jit_version().unwrap_err().is_not_initialized());
    assert!(h.vm.enable_jit(true).unwrap_err().is_not_initialized());
    assert!(h.vm.is_jit_enabled().unwrap_err().is_not_initialized());
}
