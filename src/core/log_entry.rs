//! Log entry structure

use super::log_context::LogContext;
use super::log_data::{ErrorInfo, LogData};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::panic::Location;
use uuid::Uuid;

/// Approximate call site of a log call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub file: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Source {
    pub fn new(file: impl Into<String>, line: u32, function: Option<&str>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.map(String::from),
        }
    }

    /// Location of the outermost `#[track_caller]` frame
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), None)
    }
}

/// One immutable, timestamped logging event.
///
/// Fields are only readable; a plugin that wants to change an entry builds a
/// replacement through [`LogEntry::rebuild`].
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    id: String,
    level: LogLevel,
    message: String,
    timestamp: DateTime<Utc>,
    environment: String,
    #[serde(skip_serializing_if = "LogContext::is_empty")]
    context: LogContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<LogData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Source>,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a message cannot forge extra lines in line-oriented sinks.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self::builder(level, message).build()
    }

    pub fn builder(level: LogLevel, message: impl Into<String>) -> LogEntryBuilder {
        LogEntryBuilder {
            id: None,
            level,
            message: message.into(),
            timestamp: None,
            environment: String::from("development"),
            context: LogContext::default(),
            data: None,
            error: None,
            source: None,
        }
    }

    /// Start a replacement entry carrying this entry's fields, id and timestamp
    pub fn rebuild(&self) -> LogEntryBuilder {
        LogEntryBuilder {
            id: Some(self.id.clone()),
            level: self.level,
            message: self.message.clone(),
            timestamp: Some(self.timestamp),
            environment: self.environment.clone(),
            context: self.context.clone(),
            data: self.data.clone(),
            error: self.error.clone(),
            source: self.source.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn data(&self) -> Option<&LogData> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }
}

/// Assembles a [`LogEntry`]; the only way to produce one
#[derive(Debug, Clone)]
pub struct LogEntryBuilder {
    id: Option<String>,
    level: LogLevel,
    message: String,
    timestamp: Option<DateTime<Utc>>,
    environment: String,
    context: LogContext,
    data: Option<LogData>,
    error: Option<ErrorInfo>,
    source: Option<Source>,
}

impl LogEntryBuilder {
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    #[must_use]
    pub fn context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    /// Payload; an `LogData::Error` payload becomes the entry's error
    #[must_use]
    pub fn data(mut self, data: Option<LogData>) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> LogEntry {
        let (data, error) = match self.data {
            Some(LogData::Error(promoted)) => (None, Some(promoted)),
            Some(_) if self.error.is_some() => (None, self.error),
            other => (other, self.error),
        };

        LogEntry {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            level: self.level,
            message: LogEntry::sanitize_message(&self.message),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            environment: self.environment,
            context: self.context,
            data,
            error,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_payload_promoted() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out");
        let entry = LogEntry::builder(LogLevel::Error, "request failed")
            .data(Some(LogData::from_error(&io)))
            .build();

        assert!(entry.data().is_none());
        assert_eq!(entry.error().unwrap().message, "upstream timed out");
    }

    #[test]
    fn test_explicit_error_clears_data() {
        let entry = LogEntry::builder(LogLevel::Error, "boom")
            .data(Some(LogData::from("payload")))
            .error(ErrorInfo::new("IoError", "disk"))
            .build();

        assert!(entry.data().is_none());
        assert!(entry.error().is_some());
    }

    #[test]
    fn test_plain_data_kept() {
        let entry = LogEntry::builder(LogLevel::Info, "ok")
            .data(Some(LogData::map([("n", 1)])))
            .build();

        assert!(entry.error().is_none());
        assert_eq!(entry.data().and_then(|d| d.get("n")), Some(&LogData::Int(1)));
    }

    #[test]
    fn test_message_injection_escaped() {
        let entry = LogEntry::new(LogLevel::Info, "line1\nERROR fake\tentry");
        assert_eq!(entry.message(), "line1\\nERROR fake\\tentry");
    }

    #[test]
    fn test_rebuild_keeps_identity() {
        let original = LogEntry::new(LogLevel::Warn, "original");
        let replaced = original.rebuild().message("replaced").build();

        assert_eq!(replaced.id(), original.id());
        assert_eq!(replaced.timestamp(), original.timestamp());
        assert_eq!(replaced.message(), "replaced");
        assert_eq!(original.message(), "original");
    }

    #[test]
    fn test_caller_source() {
        let source = Source::caller();
        assert!(source.file.ends_with("log_entry.rs"));
        assert!(source.line > 0);
    }

    #[test]
    fn test_unique_ids() {
        let a = LogEntry::new(LogLevel::Info, "a");
        let b = LogEntry::new(LogLevel::Info, "a");
        assert_ne!(a.id(), b.id());
    }
}
