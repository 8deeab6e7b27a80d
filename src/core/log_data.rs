//! Structured payload values and the sanitizer that bounds them
//!
//! `LogData` is what a log call carries as its `data` payload and what
//! context metadata values are made of. Payloads pass through a
//! [`Sanitizer`] before they reach an entry, so secrets are redacted and the
//! nesting depth stays bounded.

use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;
use std::fmt;

/// Replacement text for values under a sensitive key
pub const REDACTED: &str = "[REDACTED]";

/// Replacement text for containers nested beyond the depth limit
pub const MAX_DEPTH_MARKER: &str = "[Max Depth Exceeded]";

/// Default keys whose values are never logged (matched case-insensitively as substrings)
pub const DEFAULT_REDACT_KEYS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "apikey",
    "api_key",
    "authorization",
    "cookie",
    "credential",
    "private_key",
];

/// Error details carried by an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Capture an error, its `source()` chain and, when enabled through
    /// `RUST_BACKTRACE`, a backtrace.
    pub fn from_error<E: std::error::Error + 'static>(error: &E) -> Self {
        let name = short_type_name(std::any::type_name::<E>());
        Self::capture(name, error)
    }

    /// Same as [`ErrorInfo::from_error`] for trait objects, where the concrete
    /// type name is unknown.
    pub fn from_dyn(error: &(dyn std::error::Error + 'static)) -> Self {
        Self::capture("Error".to_string(), error)
    }

    fn capture(name: String, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            stack.push(backtrace.to_string());
        }

        Self {
            name,
            message: error.to_string(),
            stack: (!stack.is_empty()).then(|| stack.join("\n")),
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Value type for log payloads and context metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogData {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<LogData>),
    Map(BTreeMap<String, LogData>),
    Error(ErrorInfo),
}

impl LogData {
    /// Build a map payload from key/value pairs
    pub fn map<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<LogData>,
        I: IntoIterator<Item = (K, V)>,
    {
        LogData::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Capture an error as a payload; the logger promotes it to the entry's
    /// `error` field.
    pub fn from_error<E: std::error::Error + 'static>(error: &E) -> Self {
        LogData::Error(ErrorInfo::from_error(error))
    }

    /// Convert any serializable value. Values that fail to serialize become
    /// a string describing the failure rather than aborting the log call.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => json.into(),
            Err(e) => LogData::String(format!("[Unserializable: {}]", e)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LogData::Error(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogData::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&LogData> {
        match self {
            LogData::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for LogData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogData::Null => write!(f, "null"),
            LogData::Bool(b) => write!(f, "{}", b),
            LogData::Int(i) => write!(f, "{}", i),
            LogData::Float(fl) => write!(f, "{}", fl),
            LogData::String(s) => write!(f, "{}", s),
            LogData::Error(e) => write!(f, "{}", e),
            LogData::Array(_) | LogData::Map(_) => {
                write!(f, "{}", serde_json::to_string(self).unwrap_or_default())
            }
        }
    }
}

/// Deserializes through `serde_json::Value`; error payloads come back as maps.
impl<'de> Deserialize<'de> for LogData {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Into::into)
    }
}

impl From<String> for LogData {
    fn from(s: String) -> Self {
        LogData::String(s)
    }
}

impl From<&str> for LogData {
    fn from(s: &str) -> Self {
        LogData::String(s.to_string())
    }
}

impl From<i64> for LogData {
    fn from(i: i64) -> Self {
        LogData::Int(i)
    }
}

impl From<i32> for LogData {
    fn from(i: i32) -> Self {
        LogData::Int(i as i64)
    }
}

impl From<u32> for LogData {
    fn from(i: u32) -> Self {
        LogData::Int(i as i64)
    }
}

impl From<u64> for LogData {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(LogData::Int)
            .unwrap_or(LogData::Float(i as f64))
    }
}

impl From<usize> for LogData {
    fn from(i: usize) -> Self {
        LogData::from(i as u64)
    }
}

impl From<f64> for LogData {
    fn from(f: f64) -> Self {
        LogData::Float(f)
    }
}

impl From<bool> for LogData {
    fn from(b: bool) -> Self {
        LogData::Bool(b)
    }
}

impl From<ErrorInfo> for LogData {
    fn from(e: ErrorInfo) -> Self {
        LogData::Error(e)
    }
}

impl<T: Into<LogData>> From<Vec<T>> for LogData {
    fn from(items: Vec<T>) -> Self {
        LogData::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<LogData>> From<Option<T>> for LogData {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(LogData::Null)
    }
}

impl From<serde_json::Value> for LogData {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => LogData::Null,
            Value::Bool(b) => LogData::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => LogData::Int(i),
                None => LogData::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => LogData::String(s),
            Value::Array(items) => LogData::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                LogData::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Bounds payload depth and redacts values stored under sensitive keys
#[derive(Debug, Clone)]
pub struct Sanitizer {
    max_depth: usize,
    redact_keys: Vec<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Sanitizer {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            redact_keys: DEFAULT_REDACT_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replace the redaction list
    #[must_use]
    pub fn with_redact_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redact_keys = keys.into_iter().map(|k| k.into().to_lowercase()).collect();
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.redact_keys.iter().any(|k| key.contains(k.as_str()))
    }

    pub fn sanitize(&self, data: &LogData) -> LogData {
        self.walk(data, 0)
    }

    /// Sanitize a metadata map as if it were the top-level payload
    pub fn sanitize_map(&self, map: &BTreeMap<String, LogData>) -> BTreeMap<String, LogData> {
        self.walk_map(map, 0)
    }

    fn walk(&self, data: &LogData, depth: usize) -> LogData {
        match data {
            LogData::Array(_) | LogData::Map(_) if depth >= self.max_depth => {
                LogData::String(MAX_DEPTH_MARKER.to_string())
            }
            LogData::Array(items) => {
                LogData::Array(items.iter().map(|v| self.walk(v, depth + 1)).collect())
            }
            LogData::Map(map) => LogData::Map(self.walk_map(map, depth)),
            other => other.clone(),
        }
    }

    fn walk_map(&self, map: &BTreeMap<String, LogData>, depth: usize) -> BTreeMap<String, LogData> {
        map.iter()
            .map(|(key, value)| {
                let value = if self.is_sensitive(key) {
                    LogData::String(REDACTED.to_string())
                } else {
                    self.walk(value, depth + 1)
                };
                (key.clone(), value)
            })
            .collect()
    }
}
