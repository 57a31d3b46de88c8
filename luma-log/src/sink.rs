//! 输出目标

use crate::{Logger, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// 日志输出目标
///
/// 实现必须能跨线程共享；写入失败时静默丢弃，日志不能反过来影响宿主。
pub trait LogSink: Send + Sync {
    fn write(&self, record: &Record);
}

/// 每条记录一行，写到标准输出
pub struct StdoutSink;

/// 每条记录一行，写到标准错误
pub struct StderrSink;

impl LogSink for StdoutSink {
    fn write(&self, record: &Record) {
        let _ = writeln!(io::stdout().lock(), "{}", record.format());
    }
}

impl LogSink for StderrSink {
    fn write(&self, record: &Record) {
        let _ = writeln!(io::stderr().lock(), "{}", record.format());
    }
}

/// 追加写入日志文件
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> crate::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSink {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn write(&self, record: &Record) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(file, "{}", record.format());
    }
}

/// 把记录转交给另一个 logger（由它再按自己的级别过滤）
impl LogSink for Arc<Logger> {
    fn write(&self, record: &Record) {
        self.dispatch(record);
    }
}
