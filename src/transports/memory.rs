//! In-memory ring buffer transport

use crate::core::{
    FormatterSlot, LogEntry, LoggerError, Result, SharedFormatter, SimpleFormatter, Transport,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_MEMORY_CAPACITY: usize = 1000;

/// Keeps the most recent formatted entries; the oldest is evicted when full
pub struct MemoryTransport {
    entries: Mutex<VecDeque<String>>,
    capacity: usize,
    formatter: FormatterSlot,
    closed: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_MEMORY_CAPACITY))),
            capacity,
            formatter: FormatterSlot::with_default(Arc::new(SimpleFormatter::new())),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = FormatterSlot::explicit(formatter);
        self
    }

    /// Snapshot, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether any stored line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|line| line.contains(needle))
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LoggerError::TransportClosed(self.name().to_string()));
        }

        let line = self.formatter.format(entry);
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(line);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    fn adopt_formatter(&self, formatter: SharedFormatter) {
        self.formatter.adopt(formatter);
    }
}
