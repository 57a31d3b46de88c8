//! 环形缓冲区输出
//!
//! 保留最近的 N 条记录：崩溃时转储，测试里用来断言日志内容。

use crate::{Level, LogSink, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// 缓冲区当前状态
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RingBufferStats {
    pub record_count: usize,
    /// 被挤出缓冲区的记录数
    pub dropped_count: usize,
    pub capacity: usize,
}

#[derive(Debug, Default)]
struct Ring {
    records: VecDeque<Record>,
    dropped: usize,
}

/// 固定容量的日志缓冲区，满了以后丢弃最旧的记录
#[derive(Debug)]
pub struct LogRingBuffer {
    ring: Mutex<Ring>,
    capacity: usize,
}

impl LogRingBuffer {
    /// 返回 `Arc`，同一个缓冲区既挂在 logger 上又留给调用方读取
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(LogRingBuffer {
            ring: Mutex::new(Ring {
                records: VecDeque::with_capacity(capacity.min(4096)),
                dropped: 0,
            }),
            capacity,
        })
    }

    fn ring(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, record: &Record) {
        let mut ring = self.ring();
        if self.capacity == 0 {
            ring.dropped += 1;
            return;
        }
        while ring.records.len() >= self.capacity {
            ring.records.pop_front();
            ring.dropped += 1;
        }
        ring.records.push_back(record.clone());
    }

    /// 所有记录，从旧到新
    pub fn dump_records(&self) -> Vec<Record> {
        self.ring().records.iter().cloned().collect()
    }

    /// 指定级别的记录，从旧到新
    pub fn records_at(&self, level: Level) -> Vec<Record> {
        self.ring()
            .records
            .iter()
            .filter(|record| record.level == level)
            .cloned()
            .collect()
    }

    /// 每条记录一行的文本转储
    pub fn dump(&self) -> String {
        let ring = self.ring();
        let mut out = String::new();
        for (i, record) in ring.records.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&record.format());
        }
        out
    }

    pub fn clear(&self) {
        *self.ring() = Ring::default();
    }

    pub fn stats(&self) -> RingBufferStats {
        let ring = self.ring();
        RingBufferStats {
            record_count: ring.records.len(),
            dropped_count: ring.dropped,
            capacity: self.capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.ring().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped_count(&self) -> usize {
        self.ring().dropped
    }
}

impl LogSink for LogRingBuffer {
    fn write(&self, record: &Record) {
        self.push(record);
    }
}

impl LogSink for Arc<LogRingBuffer> {
    fn write(&self, record: &Record) {
        self.push(record);
    }
}
