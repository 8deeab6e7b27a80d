//! Structured logging context
//!
//! This module provides:
//! - `LogContext`: correlation fields and metadata attached to every entry
//! - `Timing`: duration and memory figures produced by logger timers
//! - `ContextStack` / `ContextGuard`: RAII-scoped context frames on a logger

use super::log_data::LogData;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Timing figures attached by `Logger::time_end`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Start mark in milliseconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Elapsed time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Resident memory delta in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
}

impl Timing {
    pub fn with_duration(duration_ms: f64) -> Self {
        Self {
            duration: Some(duration_ms),
            ..Default::default()
        }
    }
}

/// Context for structured logging
///
/// Plain data: copied and merged on every call, never shared mutably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, LogData>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Add a metadata field
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<LogData>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Add a metadata field (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<LogData>,
    {
        self.metadata.insert(key.into(), value.into());
    }

    /// Merge `other` on top of `self`.
    ///
    /// Top-level fields are right-biased. `metadata` merges key-wise with
    /// `other` winning per key; `timing` is replaced wholesale.
    pub fn merge(&self, other: &LogContext) -> LogContext {
        let mut metadata = self.metadata.clone();
        metadata.extend(other.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));

        LogContext {
            request_id: other.request_id.clone().or_else(|| self.request_id.clone()),
            user_id: other.user_id.clone().or_else(|| self.user_id.clone()),
            session_id: other.session_id.clone().or_else(|| self.session_id.clone()),
            component: other.component.clone().or_else(|| self.component.clone()),
            operation: other.operation.clone().or_else(|| self.operation.clone()),
            timing: other.timing.clone().or_else(|| self.timing.clone()),
            metadata,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.request_id.is_none()
            && self.user_id.is_none()
            && self.session_id.is_none()
            && self.component.is_none()
            && self.operation.is_none()
            && self.timing.is_none()
            && self.metadata.is_empty()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        let named = [
            ("requestId", &self.request_id),
            ("userId", &self.user_id),
            ("sessionId", &self.session_id),
            ("component", &self.component),
            ("operation", &self.operation),
        ];

        named
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| format!("{}={}", k, v)))
            .chain(self.metadata.iter().map(|(k, v)| format!("{}={}", k, v)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

type Frames = Arc<RwLock<Vec<(u64, LogContext)>>>;

/// Stack of scoped context frames owned by one logger handle
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Frames,
    next_id: Arc<AtomicU64>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame; it stays until the returned guard is dropped
    pub fn push(&self, context: LogContext) -> ContextGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.frames.write().push((id, context));
        ContextGuard {
            frames: Arc::clone(&self.frames),
            id,
        }
    }

    /// Merge every frame, oldest first, on top of `base`
    pub fn apply(&self, base: LogContext) -> LogContext {
        self.frames
            .read()
            .iter()
            .fold(base, |acc, (_, frame)| acc.merge(frame))
    }

    pub fn depth(&self) -> usize {
        self.frames.read().len()
    }
}

/// RAII guard for a scoped context frame
///
/// When dropped, removes exactly the frame it pushed, even if guards are
/// dropped out of order.
///
/// # Example
///
/// ```
/// use fanout_logger::prelude::*;
///
/// let logger = Logger::builder().build().expect("valid configuration");
/// {
///     let _guard = logger.push_context(LogContext::new().with_request_id("abc-123"));
///     logger.info("Processing request"); // carries requestId
/// }
/// // requestId no longer applied here
/// ```
#[must_use = "the context frame is removed as soon as the guard is dropped"]
pub struct ContextGuard {
    frames: Frames,
    id: u64,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.frames.write().retain(|(id, _)| *id != self.id);
    }
}
