//! 日志记录

use crate::Level;
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

/// Span 唯一标识，同一个 logger 内单调递增
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(pub u64);

/// 记录产生时所在的 span（例如一次引擎模块安装）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub id: SpanId,
    pub name: &'static str,
}

/// 单条日志记录
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Unix 时间戳（毫秒）
    pub timestamp_ms: u64,
    pub level: Level,
    /// 产生日志的模块路径（宏里的 `module_path!()`）
    pub target: &'static str,
    pub message: String,
    /// 最内层的活动 span
    pub span: Option<Span>,
}

impl Record {
    pub fn new(level: Level, target: &'static str, message: impl Into<String>) -> Self {
        Record {
            timestamp_ms: now_ms(),
            level,
            target,
            message: message.into(),
            span: None,
        }
    }

    pub fn in_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// 单行文本形式：`HH:MM:SS.mmm LEVEL [target] (span#id) message`
    pub fn format(&self) -> String {
        let mut line = String::with_capacity(self.message.len() + 48);
        let secs = self.timestamp_ms / 1000;
        let _ = write!(
            line,
            "{:02}:{:02}:{:02}.{:03} {:<5} [{}] ",
            (secs / 3600) % 24,
            (secs / 60) % 60,
            secs % 60,
            self.timestamp_ms % 1000,
            self.level,
            self.target
        );
        if let Some(span) = self.span {
            let _ = write!(line, "({}#{}) ", span.name, span.id.0);
        }
        line.push_str(&self.message);
        line
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
