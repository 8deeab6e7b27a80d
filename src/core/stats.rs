//! Logger statistics for observability
//!
//! Counters for how many entries were delivered, limited, filtered or lost,
//! shared by a logger and all of its child handles.

use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline counters
///
/// # Example
///
/// ```
/// use fanout_logger::LoggerStats;
///
/// let stats = LoggerStats::new();
///
/// stats.record_logged();
/// stats.record_rate_limited();
///
/// assert_eq!(stats.total_logged(), 1);
/// assert_eq!(stats.rate_limited(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerStats {
    /// Entries handed to dispatch
    total_logged: AtomicU64,

    /// Calls rejected by the rate limiter
    rate_limited: AtomicU64,

    /// Entries dropped by a plugin
    filtered: AtomicU64,

    /// Individual transport write failures
    transport_errors: AtomicU64,

    /// Writes skipped because the transport was not ready
    not_ready: AtomicU64,
}

impl LoggerStats {
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            not_ready: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_errors(&self) -> u64 {
        self.transport_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn not_ready(&self) -> u64 {
        self.not_ready.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rate_limited(&self) -> u64 {
        self.rate_limited.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_transport_error(&self) -> u64 {
        self.transport_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_not_ready(&self) -> u64 {
        self.not_ready.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of calls that passed the level gate but never reached dispatch,
    /// as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been logged.
    pub fn drop_rate(&self) -> f64 {
        let dropped = (self.rate_limited() + self.filtered()) as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.rate_limited.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.transport_errors.store(0, Ordering::Relaxed);
        self.not_ready.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerStats {
    /// Create a snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            total_logged: AtomicU64::new(self.total_logged()),
            rate_limited: AtomicU64::new(self.rate_limited()),
            filtered: AtomicU64::new(self.filtered()),
            transport_errors: AtomicU64::new(self.transport_errors()),
            not_ready: AtomicU64::new(self.not_ready()),
        }
    }
}
