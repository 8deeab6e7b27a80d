//! Transport trait for log output destinations

use super::error::{panic_message, report_internal, LoggerError, Result};
use super::formatter::SharedFormatter;
use super::log_entry::LogEntry;
use parking_lot::RwLock;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

thread_local! {
    static ISOLATION_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Whether the current thread is inside a panic-isolated pipeline call
///
/// The process panic hook uses this to leave panics the pipeline already
/// contains alone.
pub(crate) fn in_isolation() -> bool {
    ISOLATION_DEPTH.with(|depth| depth.get() > 0)
}

/// `catch_unwind` that marks the thread as isolating while `op` runs
pub(crate) fn catch_isolated<R, F>(op: F) -> std::thread::Result<R>
where
    F: FnOnce() -> R,
{
    ISOLATION_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let result = catch_unwind(AssertUnwindSafe(op));
    ISOLATION_DEPTH.with(|depth| depth.set(depth.get() - 1));
    result
}

/// A sink that delivers entries somewhere
///
/// Every method takes `&self`: transports are shared between the logger, its
/// child handles and dispatch workers, so they keep mutable state behind
/// their own locks.
///
/// After `close`, `write` must fail with [`LoggerError::TransportClosed`].
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    fn write(&self, entry: &LogEntry) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Drain buffers and release resources; calling it twice is harmless
    fn close(&self) -> Result<()> {
        self.flush()
    }

    fn is_ready(&self) -> bool {
        true
    }

    /// Called by the dispatcher when `write` fails or panics
    fn on_error(&self, error: &LoggerError) {
        report_internal(self.name(), error);
    }

    /// Take the logger-level formatter unless one was set explicitly
    fn adopt_formatter(&self, _formatter: SharedFormatter) {}
}

pub type SharedTransport = Arc<dyn Transport>;

/// Formatter held by a built-in transport
///
/// Starts with the transport's default; a formatter given explicitly at
/// construction is never replaced by [`Transport::adopt_formatter`].
pub struct FormatterSlot {
    current: RwLock<SharedFormatter>,
    explicit: bool,
}

impl FormatterSlot {
    pub fn with_default(formatter: SharedFormatter) -> Self {
        Self {
            current: RwLock::new(formatter),
            explicit: false,
        }
    }

    pub fn explicit(formatter: SharedFormatter) -> Self {
        Self {
            current: RwLock::new(formatter),
            explicit: true,
        }
    }

    pub fn format(&self, entry: &LogEntry) -> String {
        self.current.read().format(entry)
    }

    pub fn adopt(&self, formatter: SharedFormatter) {
        if !self.explicit {
            *self.current.write() = formatter;
        }
    }

    pub fn name(&self) -> String {
        self.current.read().name().to_string()
    }
}

/// Run one transport operation, turning a panic into a transport error
pub(crate) fn isolated<F>(transport: &dyn Transport, op: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match catch_isolated(op) {
        Ok(result) => result,
        Err(payload) => Err(LoggerError::transport(
            transport.name(),
            format!("panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

/// Outcome of one [`deliver`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Written,
    /// `is_ready` was false; the entry was not offered and nothing is reported
    NotReady,
    /// `write` failed or panicked and `on_error` was called
    Failed,
}

/// Write with panic isolation, reporting any failure through `on_error`
///
/// A transport that is not ready is skipped.
pub(crate) fn deliver(transport: &dyn Transport, entry: &LogEntry) -> Delivery {
    let ready = match catch_isolated(|| transport.is_ready()) {
        Ok(ready) => ready,
        Err(payload) => {
            transport.on_error(&LoggerError::transport(
                transport.name(),
                format!("is_ready panicked: {}", panic_message(payload.as_ref())),
            ));
            return Delivery::Failed;
        }
    };
    if !ready {
        return Delivery::NotReady;
    }

    match isolated(transport, || transport.write(entry)) {
        Ok(()) => Delivery::Written,
        Err(e) => {
            transport.on_error(&e);
            Delivery::Failed
        }
    }
}
