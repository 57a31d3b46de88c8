//! CLI 日志系统初始化
//!
//! 桥内部使用 luma-log 的显式 logger；CLI 通过 [`TracingSink`] 把记录转发给
//! `tracing`，由 `tracing-subscriber` 负责格式化输出。

use luma_config::LogLevel;
use luma_log::{LogSink, Logger, Record};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// 转发到 tracing 时使用的统一 target
pub const TRACING_TARGET: &str = "luma";

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

/// 日志输出格式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    #[default]
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// 把 luma-log 记录转成 tracing 事件
///
/// 记录的原始模块路径放在 `module` 字段里。
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, record: &Record) {
        let module = record.target;
        let message = record.message.as_str();
        match record.level {
            luma_log::Level::Trace => {
                tracing::trace!(target: TRACING_TARGET, module, "{}", message)
            }
            luma_log::Level::Debug => {
                tracing::debug!(target: TRACING_TARGET, module, "{}", message)
            }
            luma_log::Level::Info => tracing::info!(target: TRACING_TARGET, module, "{}", message),
            luma_log::Level::Warn => tracing::warn!(target: TRACING_TARGET, module, "{}", message),
            luma_log::Level::Error => {
                tracing::error!(target: TRACING_TARGET, module, "{}", message)
            }
        }
    }
}

pub fn log_level(level: LogLevel) -> luma_log::Level {
    match level {
        LogLevel::Trace => luma_log::Level::Trace,
        LogLevel::Debug => luma_log::Level::Debug,
        LogLevel::Info => luma_log::Level::Info,
        LogLevel::Warn => luma_log::Level::Warn,
        LogLevel::Error => luma_log::Level::Error,
    }
}

pub fn tracing_level(level: LogLevel) -> tracing::Level {
    match level {
        LogLevel::Trace => tracing::Level::TRACE,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Error => tracing::Level::ERROR,
    }
}

/// 初始化 tracing 订阅者并返回转发到它的 logger
///
/// 订阅者在进程内只安装一次，重复调用只创建新的 logger。
pub fn init(level: LogLevel, format: LogFormat) -> Arc<Logger> {
    SUBSCRIBER.get_or_init(|| {
        let targets = Targets::new().with_default(tracing_level(level));
        let stderr_layer = create_format_layer(format, io::stderr).with_filter(targets);
        // 已有全局订阅者时（例如测试）保留原有的
        let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
    });

    Logger::new(log_level(level)).with_sink(TracingSink)
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(
    format: LogFormat,
    make_writer: F,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::SystemTime)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::SystemTime)
            .with_writer(make_writer)
            .boxed(),
    }
}
