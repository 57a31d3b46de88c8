//! 日志宏
//!
//! 每个宏的第一个参数是 logger（任何能调用 `is_enabled` 和 `log` 的表达式，
//! 通常是 `Arc<Logger>` 或 `&Logger`），其余参数同 `format!`。
//! 级别未启用时不会格式化消息。target 固定为调用处的 `module_path!()`。

#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log(level, ::std::module_path!(), ::std::format!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => { $crate::log!($logger, $crate::Level::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => { $crate::log!($logger, $crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => { $crate::log!($logger, $crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => { $crate::log!($logger, $crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => { $crate::log!($logger, $crate::Level::Error, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use crate::{Level, LogRingBuffer, Logger};
    use std::cell::Cell;

    #[test]
    fn test_target_is_call_site_module() {
        let ring = LogRingBuffer::new(4);
        let logger = Logger::new(Level::Trace).with_sink(ring.clone());
        info!(logger, "module '{}' resolved from {}", "util", "Scripts/util.lua");

        let record = &ring.dump_records()[0];
        assert_eq!(record.target, "luma_log::macros::tests");
        assert_eq!(record.message, "module 'util' resolved from Scripts/util.lua");
    }

    #[test]
    fn test_each_macro_uses_its_level() {
        let ring = LogRingBuffer::new(8);
        let logger = Logger::new(Level::Trace).with_sink(ring.clone());
        trace!(logger, "t");
        debug!(logger, "d");
        info!(logger, "i");
        warn!(logger, "w");
        error!(logger, "e");

        let levels: Vec<Level> = ring.dump_records().iter().map(|r| r.level).collect();
        assert_eq!(levels, Level::ALL.to_vec());
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        let logger = Logger::new(Level::Error);
        let evaluated = Cell::new(false);
        let expensive = || {
            evaluated.set(true);
            "traceback"
        };
        debug!(logger, "{}", expensive());
        assert!(!evaluated.get());

        error!(logger, "{}", expensive());
        assert!(evaluated.get());
    }

    #[test]
    fn test_accepts_logger_reference() {
        let ring = LogRingBuffer::new(4);
        let logger = Logger::new(Level::Info).with_sink(ring.clone());
        let borrowed: &Logger = &logger;
        warn!(borrowed, "via reference");
        assert_eq!(ring.len(), 1);
    }
}
