//! luma-log - 脚本桥的结构化日志
//!
//! - logger 显式传递（`Arc<Logger>`），没有全局状态
//! - 输出目标可组合：stdout / stderr / 文件 / 环形缓冲区 / 另一个 logger
//! - span 标记一段操作（例如一次引擎模块安装），其间的记录都带上 span
//!
//! ```
//! use luma_log::{info, Level, LogConfig};
//!
//! let (logger, ring) = LogConfig::new(Level::Debug).with_ring_buffer(64).init();
//! {
//!     let _span = logger.enter_span("init");
//!     info!(logger, "script runtime initialized (Lua {})", "5.1");
//! }
//! let records = ring.unwrap().dump_records();
//! assert_eq!(records[0].span.map(|s| s.name), Some("init"));
//! ```

mod config;
mod level;
mod logger;
mod macros;
mod record;
mod ring_buffer;
mod sink;

pub use config::{LogConfig, OutputConfig};
pub use level::Level;
pub use logger::{Logger, SpanGuard};
pub use record::{Record, Span, SpanId};
pub use ring_buffer::{LogRingBuffer, RingBufferStats};
pub use sink::{FileSink, LogSink, StderrSink, StdoutSink};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot open log output: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),
}
