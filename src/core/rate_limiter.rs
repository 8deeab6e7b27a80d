//! Fixed-window rate limiting for log calls

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source for the limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

/// Which key a log call is counted under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// Every call shares one window
    #[default]
    Global,
    /// One window per level name
    PerLevel,
}

/// Rate limit settings for a logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admissions allowed per window
    pub max: u32,
    pub window_ms: u64,
    pub scope: RateLimitScope,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max: 100,
            window_ms: 1000,
            scope: RateLimitScope::Global,
        }
    }
}

impl RateLimitConfig {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window_ms: window.as_millis() as u64,
            scope: RateLimitScope::Global,
        }
    }

    #[must_use]
    pub fn per_level(mut self) -> Self {
        self.scope = RateLimitScope::PerLevel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max == 0 {
            return Err(LoggerError::config("rate_limit", "max must be positive"));
        }
        if self.window_ms == 0 {
            return Err(LoggerError::config("rate_limit", "window_ms must be positive"));
        }
        Ok(())
    }

    /// Limiter key for a call at `level`
    pub fn key_for(&self, level: LogLevel) -> &'static str {
        match self.scope {
            RateLimitScope::Global => "global",
            RateLimitScope::PerLevel => level.to_str(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter per key
///
/// The first admission for a key opens a window; up to `max` calls are
/// admitted until the window ends, and the first call after that starts a
/// fresh window with a count of one. Keys are created lazily and never
/// evicted.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self::with_clock(max, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.max, Duration::from_millis(config.window_ms)))
    }

    pub fn is_allowed(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut windows = self.windows.lock();

        match windows.get_mut(key) {
            Some(window) if now < window.reset_at => {
                if window.count < self.max {
                    window.count += 1;
                    true
                } else {
                    false
                }
            }
            Some(window) => {
                window.count = 1;
                window.reset_at = now + self.window;
                true
            }
            None => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Forget one key's window, or every window when `key` is `None`
    pub fn reset(&self, key: Option<&str>) {
        let mut windows = self.windows.lock();
        match key {
            Some(key) => {
                windows.remove(key);
            }
            None => windows.clear(),
        }
    }

    /// Admissions counted in the key's current window
    pub fn current_count(&self, key: &str) -> u32 {
        self.windows.lock().get(key).map_or(0, |w| w.count)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max", &self.max)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
