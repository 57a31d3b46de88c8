//! 日志器

use crate::record::{Span, SpanId};
use crate::{Level, LogSink, Record};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// 日志器
///
/// 没有全局实例：调用方持有 `Arc<Logger>` 并显式传给需要记录日志的组件。
/// 级别可以在运行中调整，输出目标只增不减。
pub struct Logger {
    level: AtomicU8,
    sinks: RwLock<Vec<Box<dyn LogSink>>>,
    spans: Mutex<Vec<Span>>,
    next_span: AtomicU64,
}

impl Logger {
    /// 没有输出目标的日志器，用 [`with_sink`](Self::with_sink) 添加
    pub fn new(level: Level) -> Arc<Self> {
        Arc::new(Logger {
            level: AtomicU8::new(level as u8),
            sinks: RwLock::new(Vec::new()),
            spans: Mutex::new(Vec::new()),
            next_span: AtomicU64::new(1),
        })
    }

    /// 什么也不输出的日志器
    pub fn noop() -> Arc<Self> {
        Self::new(Level::Error)
    }

    pub fn with_sink<S: LogSink + 'static>(self: Arc<Self>, sink: S) -> Arc<Self> {
        self.add_sink(sink);
        self
    }

    pub fn add_sink<S: LogSink + 'static>(&self, sink: S) {
        self.sinks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(sink));
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// 记录一条日志；宏最终都落到这里
    #[inline(never)]
    pub fn log(&self, level: Level, target: &'static str, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }
        let mut record = Record::new(level, target, message);
        if let Some(span) = self.spans().last() {
            record = record.in_span(*span);
        }
        self.emit(&record);
    }

    /// 转发一条已经构造好的记录（保留原有时间戳和 span）
    pub(crate) fn dispatch(&self, record: &Record) {
        if self.is_enabled(record.level) {
            self.emit(record);
        }
    }

    fn emit(&self, record: &Record) {
        for sink in self.sinks.read().unwrap_or_else(|e| e.into_inner()).iter() {
            sink.write(record);
        }
    }

    /// 进入命名 span，守卫释放时退出
    pub fn enter_span(self: &Arc<Self>, name: &'static str) -> SpanGuard {
        let id = SpanId(self.next_span.fetch_add(1, Ordering::Relaxed));
        self.spans().push(Span { id, name });
        SpanGuard {
            logger: Arc::clone(self),
            id,
        }
    }

    pub fn span_depth(&self) -> usize {
        self.spans().len()
    }

    pub fn current_span(&self) -> Option<&'static str> {
        self.spans().last().map(|span| span.name)
    }

    fn spans(&self) -> MutexGuard<'_, Vec<Span>> {
        self.spans.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("sinks", &self.sink_count())
            .field("current_span", &self.current_span())
            .finish()
    }
}

/// [`Logger::enter_span`] 返回的守卫
#[must_use = "the span ends as soon as the guard is dropped"]
pub struct SpanGuard {
    logger: Arc<Logger>,
    id: SpanId,
}

impl SpanGuard {
    pub fn id(&self) -> SpanId {
        self.id
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        let mut spans = self.logger.spans();
        // 守卫可能不按嵌套顺序释放，按 id 移除
        if let Some(pos) = spans.iter().rposition(|span| span.id == self.id) {
            spans.remove(pos);
        }
    }
}
