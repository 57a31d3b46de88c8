//! 测试辅助工具
//!
//! 用内存文件系统 + 环形缓冲区日志搭建脚本桥，便于断言脚本行为和日志输出

#![allow(dead_code)]

use luma_config::BridgeConfig;
use luma_core::ScriptVm;
use luma_log::{Level, LogConfig, LogRingBuffer};
use luma_vfs::MemoryFileSystem;
use std::sync::Arc;

/// 测试用宿主上下文
#[derive(Debug)]
pub struct GameWorld {
    pub name: String,
    pub gravity: f64,
}

impl GameWorld {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(GameWorld {
            name: name.to_string(),
            gravity: -9.8,
        })
    }
}

pub struct Harness {
    pub vm: ScriptVm<GameWorld>,
    pub fs: MemoryFileSystem,
    pub ring: Arc<LogRingBuffer>,
}

/// 默认配置的脚本桥（未 init）
pub fn harness(files: &[(&str, &str)]) -> Harness {
    harness_with_config(BridgeConfig::default(), files)
}

pub fn harness_with_config(config: BridgeConfig, files: &[(&str, &str)]) -> Harness {
    let fs = MemoryFileSystem::with_files(
        files
            .iter()
            .map(|(path, source)| (*path, source.as_bytes().to_vec())),
    );
    let (logger, ring) = LogConfig::test().init();
    let ring = ring.expect("test config has a ring buffer");
    let vm = ScriptVm::new(config, Arc::new(fs.clone()), logger).unwrap();
    Harness { vm, fs, ring }
}

/// init + 安装引擎模块（无额外模块组）
pub fn ready(files: &[(&str, &str)]) -> Harness {
    let mut h = harness(files);
    h.vm.init().unwrap();
    h.vm
        .init_engine_module(GameWorld::new("test"), &luma_core::ModuleRegistry::new())
        .unwrap();
    h
}

/// 所有 Error 级别日志的消息
pub fn error_lines(ring: &LogRingBuffer) -> Vec<String> {
    ring.records_at(Level::Error)
        .into_iter()
        .map(|r| r.message)
        .collect()
}

/// 所有 Info 级别日志的消息
pub fn info_lines(ring: &LogRingBuffer) -> Vec<String> {
    ring.records_at(Level::Info)
        .into_iter()
        .map(|r| r.message)
        .collect()
}
