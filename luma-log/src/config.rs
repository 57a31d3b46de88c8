//! 一次性组装 logger 的配置

use crate::{FileSink, Level, LogRingBuffer, Logger, StderrSink, StdoutSink};
use std::sync::Arc;

/// 一个输出目标
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputConfig {
    Stdout,
    Stderr,
    /// 追加写入的文件路径
    File(String),
    /// 环形缓冲区容量
    RingBuffer(usize),
}

/// 日志配置
///
/// ```
/// use luma_log::{LogConfig, Level};
///
/// let (logger, ring) = LogConfig::new(Level::Info).with_ring_buffer(128).init();
/// luma_log::warn!(logger, "debugger refused the connection");
/// assert_eq!(ring.unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    pub level: Level,
    pub outputs: Vec<OutputConfig>,
}

impl LogConfig {
    pub fn new(level: Level) -> Self {
        LogConfig {
            level,
            outputs: Vec::new(),
        }
    }

    /// Debug 级别，stdout，外加 10000 条的崩溃转储缓冲
    pub fn dev() -> Self {
        Self::new(Level::Debug)
            .with_stdout()
            .with_ring_buffer(10_000)
    }

    /// Warn 级别，stderr，外加 1000 条的崩溃转储缓冲
    pub fn production() -> Self {
        Self::new(Level::Warn)
            .with_stderr()
            .with_ring_buffer(1_000)
    }

    /// Trace 级别，只写环形缓冲区
    pub fn test() -> Self {
        Self::new(Level::Trace).with_ring_buffer(1_000)
    }

    pub fn with_stdout(self) -> Self {
        self.with_unique(OutputConfig::Stdout)
    }

    pub fn with_stderr(self) -> Self {
        self.with_unique(OutputConfig::Stderr)
    }

    pub fn with_file(self, path: impl Into<String>) -> Self {
        self.with_unique(OutputConfig::File(path.into()))
    }

    pub fn with_ring_buffer(mut self, capacity: usize) -> Self {
        self.outputs.push(OutputConfig::RingBuffer(capacity));
        self
    }

    fn with_unique(mut self, output: OutputConfig) -> Self {
        if !self.outputs.contains(&output) {
            self.outputs.push(output);
        }
        self
    }

    /// 创建 logger
    ///
    /// 返回最后一个环形缓冲区（如果配置了）。打不开的日志文件会被跳过，
    /// 并在其余输出上记一条 Warn。
    pub fn init(self) -> (Arc<Logger>, Option<Arc<LogRingBuffer>>) {
        let logger = Logger::new(self.level);
        let mut ring = None;
        let mut failed_files = Vec::new();

        for output in self.outputs {
            match output {
                OutputConfig::Stdout => logger.add_sink(StdoutSink),
                OutputConfig::Stderr => logger.add_sink(StderrSink),
                OutputConfig::File(path) => match FileSink::new(&path) {
                    Ok(sink) => logger.add_sink(sink),
                    Err(e) => failed_files.push(format!("cannot open log file '{path}': {e}")),
                },
                OutputConfig::RingBuffer(capacity) => {
                    let buffer = LogRingBuffer::new(capacity);
                    logger.add_sink(Arc::clone(&buffer));
                    ring = Some(buffer);
                }
            }
        }

        for message in failed_files {
            logger.log(Level::Warn, module_path!(), message);
        }
        (logger, ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let dev = LogConfig::dev();
        assert_eq!(dev.level, Level::Debug);
        assert_eq!(
            dev.outputs,
            vec![OutputConfig::Stdout, OutputConfig::RingBuffer(10_000)]
        );

        let prod = LogConfig::production();
        assert_eq!(prod.level, Level::Warn);
        assert!(prod.outputs.contains(&OutputConfig::Stderr));

        assert_eq!(LogConfig::test().outputs, vec![OutputConfig::RingBuffer(1_000)]);
    }

    #[test]
    fn test_console_outputs_are_not_duplicated() {
        let config = LogConfig::new(Level::Info)
            .with_stderr()
            .with_stderr()
            .with_file("a.log")
            .with_file("a.log");
        assert_eq!(config.outputs.len(), 2);
    }

    #[test]
    fn test_init_hands_back_last_ring() {
        let (logger, ring) = LogConfig::new(Level::Info)
            .with_ring_buffer(2)
            .with_ring_buffer(5)
            .init();
        assert_eq!(ring.as_ref().map(|r| r.capacity()), Some(5));
        logger.log(Level::Info, "test", "seen");
        assert_eq!(ring.unwrap().len(), 1);
    }

    #[test]
    fn test_unopenable_file_is_reported() {
        let (_, ring) = LogConfig::test()
            .with_file("/nonexistent-dir/luma/bridge.log")
            .init();
        let warnings = ring.unwrap().records_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("bridge.log"));
    }

    #[test]
    fn test_no_ring_without_request() {
        let (logger, ring) = LogConfig::new(Level::Error).init();
        assert!(ring.is_none());
        assert_eq!(logger.sink_count(), 0);
    }
}
