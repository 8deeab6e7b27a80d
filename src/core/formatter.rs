//! Formatters turn an entry into one output string
//!
//! Provided styles:
//! - `SimpleFormatter`: bracketed single line
//! - `JsonFormatter`: canonical structured object
//! - `ConsoleFormatter`: simple layout with colour and inline timing
//! - `LogfmtFormatter`: key=value pairs for log shippers
//!
//! Formatters are pure: they never mutate the entry and never perform I/O.

use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;
use std::sync::Arc;

pub trait Formatter: Send + Sync {
    fn format(&self, entry: &LogEntry) -> String;

    fn name(&self) -> &str;
}

/// Formatter shared between transports
pub type SharedFormatter = Arc<dyn Formatter>;

/// Default cap on rendered message length for the simple formatter
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 1000;

fn truncate(message: &str, max: usize) -> String {
    if message.chars().count() <= max {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}

/// The `[Data: ...] [Error: ...]` tail shared by the text formatters
fn payload_suffix(entry: &LogEntry) -> String {
    let mut suffix = String::new();
    if let Some(data) = entry.data() {
        suffix.push_str(&format!(" [Data: {}]", data));
    }
    if let Some(error) = entry.error() {
        suffix.push_str(&format!(" [Error: {}]", error));
    }
    suffix
}

fn format_bytes(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "+" };
    let abs = bytes.unsigned_abs() as f64;
    if abs >= 1024.0 * 1024.0 {
        format!("{}{:.1}MB", sign, abs / (1024.0 * 1024.0))
    } else if abs >= 1024.0 {
        format!("{}{:.1}KB", sign, abs / 1024.0)
    } else {
        format!("{}{}B", sign, abs)
    }
}

/// `[timestamp] [LEVEL] [component] [requestId] message [Data: ...] [Error: ...]`
#[derive(Debug, Clone)]
pub struct SimpleFormatter {
    timestamp_format: TimestampFormat,
    max_message_length: usize,
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

impl SimpleFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }
}

impl Formatter for SimpleFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let mut line = format!(
            "[{}] [{}]",
            self.timestamp_format.format(entry.timestamp()),
            entry.level()
        );

        let context = entry.context();
        if let Some(ref component) = context.component {
            line.push_str(&format!(" [{}]", component));
        }
        if let Some(ref request_id) = context.request_id {
            line.push_str(&format!(" [{}]", request_id));
        }

        line.push(' ');
        line.push_str(&truncate(entry.message(), self.max_message_length));
        line.push_str(&payload_suffix(entry));
        line
    }

    fn name(&self) -> &str {
        "simple"
    }
}

/// Canonical JSON object per entry
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
    include_stack: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self {
            pretty: false,
            include_stack: true,
        }
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact, stack-free output for production sinks
    pub fn production() -> Self {
        Self {
            pretty: false,
            include_stack: false,
        }
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn with_stack(mut self, include_stack: bool) -> Self {
        self.include_stack = include_stack;
        self
    }

    /// The structured value this formatter renders
    pub fn to_value(&self, entry: &LogEntry) -> serde_json::Value {
        use serde_json::Value;

        let mut obj = serde_json::Map::new();
        obj.insert("id".to_string(), Value::String(entry.id().to_string()));
        obj.insert(
            "timestamp".to_string(),
            Value::String(TimestampFormat::Rfc3339Exact.format(entry.timestamp())),
        );
        obj.insert(
            "level".to_string(),
            Value::String(entry.level().to_str().to_string()),
        );
        obj.insert(
            "message".to_string(),
            Value::String(entry.message().to_string()),
        );
        obj.insert(
            "environment".to_string(),
            Value::String(entry.environment().to_string()),
        );

        if !entry.context().is_empty() {
            obj.insert(
                "context".to_string(),
                serde_json::to_value(entry.context()).unwrap_or(Value::Null),
            );
        }
        if let Some(data) = entry.data() {
            obj.insert("data".to_string(), data.to_json_value());
        }
        if let Some(error) = entry.error() {
            let mut error = error.clone();
            if !self.include_stack {
                error.stack = None;
            }
            obj.insert(
                "error".to_string(),
                serde_json::to_value(&error).unwrap_or(Value::Null),
            );
        }
        if let Some(source) = entry.source() {
            obj.insert(
                "source".to_string(),
                serde_json::to_value(source).unwrap_or(Value::Null),
            );
        }

        Value::Object(obj)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let value = self.to_value(entry);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        rendered.unwrap_or_default()
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Human-oriented console output
///
/// Adds a coloured level label (bold for errors) and inline timing/memory.
/// With colours off, the output is plain text in the same layout.
#[derive(Debug, Clone)]
pub struct ConsoleFormatter {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    max_message_length: usize,
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            timestamp_format: TimestampFormat::TimeOnly,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn level_label(&self, entry: &LogEntry) -> String {
        let label = format!("{:7}", entry.level());
        #[cfg(feature = "console")]
        if self.use_colors {
            use colored::Colorize;
            let colored = label.color(entry.level().color_code());
            return if entry.level() == super::log_level::LogLevel::Error {
                colored.bold().to_string()
            } else {
                colored.to_string()
            };
        }
        label
    }

    fn timing_suffix(entry: &LogEntry) -> String {
        let Some(timing) = entry.context().timing.as_ref() else {
            return String::new();
        };

        let mut parts = Vec::new();
        if let Some(duration) = timing.duration {
            parts.push(format!("{:.2}ms", duration));
        }
        if let Some(memory) = timing.memory {
            parts.push(format_bytes(memory));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

impl Formatter for ConsoleFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let mut line = format!(
            "{} {}",
            self.timestamp_format.format(entry.timestamp()),
            self.level_label(entry)
        );

        let context = entry.context();
        if let Some(ref component) = context.component {
            line.push_str(&format!(" [{}]", component));
        }
        if let Some(ref request_id) = context.request_id {
            line.push_str(&format!(" [{}]", request_id));
        }

        line.push(' ');
        line.push_str(&truncate(entry.message(), self.max_message_length));
        line.push_str(&Self::timing_suffix(entry));
        line.push_str(&payload_suffix(entry));
        line
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Logfmt format (key=value pairs)
///
/// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO message="Request processed"`
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormatter {
    timestamp_format: TimestampFormat,
}

impl LogfmtFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape a logfmt key (remove spaces and special chars)
    fn escape_key(key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
            .collect()
    }

    /// Quote a logfmt value when it contains spaces, quotes or `=`
    fn escape_value(value: &str) -> String {
        if value.is_empty() || value.contains(' ') || value.contains('"') || value.contains('=') {
            Self::quote_value(value)
        } else {
            value.to_string()
        }
    }

    fn quote_value(value: &str) -> String {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

impl Formatter for LogfmtFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let mut parts = vec![
            format!(
                "timestamp={}",
                Self::escape_value(&self.timestamp_format.format(entry.timestamp()))
            ),
            format!("level={}", entry.level()),
            format!("message={}", Self::quote_value(entry.message())),
        ];

        let context = entry.context();
        let named = [
            ("request_id", &context.request_id),
            ("user_id", &context.user_id),
            ("session_id", &context.session_id),
            ("component", &context.component),
            ("operation", &context.operation),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                parts.push(format!("{}={}", key, Self::escape_value(value)));
            }
        }
        if let Some(duration) = context.timing.as_ref().and_then(|t| t.duration) {
            parts.push(format!("duration_ms={:.3}", duration));
        }
        for (key, value) in &context.metadata {
            parts.push(format!(
                "{}={}",
                Self::escape_key(key),
                Self::escape_value(&value.to_string())
            ));
        }
        if let Some(data) = entry.data() {
            parts.push(format!("data={}", Self::quote_value(&data.to_string())));
        }
        if let Some(error) = entry.error() {
            parts.push(format!("error={}", Self::quote_value(&error.to_string())));
        }

        parts.join(" ")
    }

    fn name(&self) -> &str {
        "logfmt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorInfo, LogContext, LogData, LogLevel, Timing};
    use chrono::{DateTime, Utc};

    fn entry_with_context() -> LogEntry {
        LogEntry::builder(LogLevel::Info, "User logged in")
            .context(
                LogContext::new()
                    .with_component("auth")
                    .with_request_id("req-42")
                    .with_field("attempt", 2),
            )
            .data(Some(LogData::map([("user", "alice")])))
            .build()
    }

    #[test]
    fn test_simple_layout() {
        let line = SimpleFormatter::new().format(&entry_with_context());
        assert!(line.contains("] [INFO] [auth] [req-42] User logged in"));
        assert!(line.ends_with(r#"[Data: {"user":"alice"}]"#));
    }

    #[test]
    fn test_simple_error_suffix() {
        let entry = LogEntry::builder(LogLevel::Error, "failed")
            .error(ErrorInfo::new("IoError", "disk full"))
            .build();
        let line = SimpleFormatter::new().format(&entry);
        assert!(line.ends_with("failed [Error: IoError: disk full]"));
    }

    #[test]
    fn test_simple_truncates_message() {
        let entry = LogEntry::new(LogLevel::Info, "abcdefghij");
        let line = SimpleFormatter::new()
            .with_max_message_length(4)
            .format(&entry);
        assert!(line.ends_with(" abcd..."));
    }

    #[test]
    fn test_json_round_trip_fields() {
        let entry = entry_with_context();
        let rendered = JsonFormatter::new().format(&entry);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        let level: LogLevel = parsed["level"].as_str().unwrap().parse().unwrap();
        assert_eq!(level, entry.level());
        assert_eq!(parsed["message"], entry.message());

        let timestamp = DateTime::parse_from_rfc3339(parsed["timestamp"].as_str().unwrap())
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(&timestamp, entry.timestamp());

        assert_eq!(parsed["context"]["requestId"], "req-42");
        assert_eq!(parsed["context"]["metadata"]["attempt"], 2);
        assert_eq!(parsed["data"]["user"], "alice");
    }

    #[test]
    fn test_json_strips_stack_in_production() {
        let entry = LogEntry::builder(LogLevel::Error, "crash")
            .error(ErrorInfo::new("Panic", "boom").with_stack("frame 1\nframe 2"))
            .build();

        let full: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new().format(&entry)).unwrap();
        assert_eq!(full["error"]["stack"], "frame 1\nframe 2");

        let prod: serde_json::Value =
            serde_json::from_str(&JsonFormatter::production().format(&entry)).unwrap();
        assert!(prod["error"].get("stack").is_none());
        assert_eq!(prod["error"]["message"], "boom");
    }

    #[test]
    fn test_json_pretty_is_multiline() {
        let rendered = JsonFormatter::new()
            .with_pretty(true)
            .format(&LogEntry::new(LogLevel::Info, "x"));
        assert!(rendered.contains('\n'));
    }

    #[test]
    fn test_console_plain_without_colors() {
        let entry = LogEntry::builder(LogLevel::Info, "op done")
            .context(LogContext::new().with_timing(Timing {
                start_time: None,
                duration: Some(12.4),
                memory: Some(1536),
            }))
            .build();

        let line = ConsoleFormatter::with_colors(false).format(&entry);
        assert!(line.contains("INFO    op done (12.40ms, +1.5KB)"));
        assert!(!line.contains('\u{1b}'));
    }

    #[test]
    fn test_logfmt_quotes_values() {
        let entry = LogEntry::builder(LogLevel::Debug, "Query executed")
            .context(LogContext::new().with_field("query", "SELECT * FROM users WHERE id=1"))
            .build();

        let line = LogfmtFormatter::new().format(&entry);
        assert!(line.contains("level=DEBUG"));
        assert!(line.contains("message=\"Query executed\""));
        assert!(line.contains("query=\"SELECT * FROM users WHERE id=1\""));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "+512B");
        assert_eq!(format_bytes(-2048), "-2.0KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "+3.0MB");
    }
}
