//! Plugin hooks around dispatch
//!
//! Plugins see every entry that passed the level gate and the rate limiter.
//! `before_transport` hooks run in registration order and may replace or
//! drop the entry; `after_transport` hooks only observe.

use super::config::LoggerConfig;
use super::error::Result;
use super::log_context::LogContext;
use super::log_data::LogData;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use std::collections::HashMap;
use std::sync::Arc;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Called once at registration; an error keeps the plugin out
    fn init(&self, _config: &LoggerConfig) -> Result<()> {
        Ok(())
    }

    /// Return `None` to drop the entry
    fn before_transport(&self, entry: LogEntry) -> Option<LogEntry> {
        Some(entry)
    }

    fn after_transport(&self, _entry: &LogEntry) {}

    /// Called once when the logger closes
    fn destroy(&self) {}
}

pub type SharedPlugin = Arc<dyn Plugin>;

/// Per-component level floors
///
/// Entries from a listed component are dropped when their level is more
/// verbose than that component's floor. Other entries pass unchanged.
///
/// # Example
///
/// ```
/// use fanout_logger::{LevelOverridePlugin, LogLevel};
///
/// let plugin = LevelOverridePlugin::new()
///     .with_level("database", LogLevel::Warn)
///     .with_level("http-client", LogLevel::Error);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevelOverridePlugin {
    levels: HashMap<String, LogLevel>,
}

impl LevelOverridePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_level(mut self, component: impl Into<String>, level: LogLevel) -> Self {
        self.levels.insert(component.into(), level);
        self
    }
}

impl Plugin for LevelOverridePlugin {
    fn name(&self) -> &str {
        "level-override"
    }

    fn before_transport(&self, entry: LogEntry) -> Option<LogEntry> {
        let floor = entry
            .context()
            .component
            .as_deref()
            .and_then(|component| self.levels.get(component));

        match floor {
            Some(&floor) if !LogLevel::should_log(floor, entry.level()) => None,
            _ => Some(entry),
        }
    }
}

/// Stamps fixed metadata onto every entry
///
/// Fields already present on the entry win over injected ones.
#[derive(Debug, Clone, Default)]
pub struct FieldInjectorPlugin {
    fields: LogContext,
}

impl FieldInjectorPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<LogData>) -> Self {
        self.fields.add_field(key, value);
        self
    }
}

impl Plugin for FieldInjectorPlugin {
    fn name(&self) -> &str {
        "field-injector"
    }

    fn before_transport(&self, entry: LogEntry) -> Option<LogEntry> {
        if self.fields.metadata.is_empty() {
            return Some(entry);
        }
        let context = self.fields.merge(entry.context());
        Some(entry.rebuild().context(context).build())
    }
}
