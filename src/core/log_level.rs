//! Log level definitions

use super::error::{LoggerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Severity of a log entry, ordered by rank.
///
/// `Silent` disables output entirely. Every other level admits itself and all
/// lower-ranked (louder) levels: `Info` lets `Error`, `Warn` and `Info` through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Silent = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Http = 4,
    Verbose = 5,
    Debug = 6,
    Silly = 7,
}

impl LogLevel {
    const ALL: [LogLevel; 8] = [
        LogLevel::Silent,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Http,
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Silly,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "SILENT",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Http => "HTTP",
            LogLevel::Verbose => "VERBOSE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Silly => "SILLY",
        }
    }

    #[inline]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// All levels in rank order
    pub fn all() -> &'static [LogLevel] {
        &Self::ALL
    }

    pub fn from_rank(rank: u8) -> Result<Self> {
        Self::ALL
            .get(rank as usize)
            .copied()
            .ok_or_else(|| LoggerError::invalid_level(rank.to_string()))
    }

    /// Whether an entry at `target` passes a logger configured at `configured`
    #[inline]
    pub fn should_log(configured: LogLevel, target: LogLevel) -> bool {
        configured != LogLevel::Silent && target != LogLevel::Silent && target <= configured
    }

    /// Levels routed to stderr by the console transport
    pub fn is_error_stream(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Warn)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Silent => White,
            LogLevel::Error => Red,
            LogLevel::Warn => Yellow,
            LogLevel::Info => Green,
            LogLevel::Http => Cyan,
            LogLevel::Verbose => Blue,
            LogLevel::Debug => Magenta,
            LogLevel::Silly => BrightBlack,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "SILENT" => Ok(LogLevel::Silent),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "HTTP" => Ok(LogLevel::Http),
            "VERBOSE" => Ok(LogLevel::Verbose),
            "DEBUG" => Ok(LogLevel::Debug),
            "SILLY" => Ok(LogLevel::Silly),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Rank(u8),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            Repr::Rank(rank) => LogLevel::from_rank(rank).map_err(serde::de::Error::custom),
        }
    }
}

/// Anything a log call accepts as its level: the enum itself, a symbolic
/// name, or a numeric rank.
pub trait IntoLogLevel {
    fn into_level(self) -> Result<LogLevel>;
}

impl IntoLogLevel for LogLevel {
    #[inline]
    fn into_level(self) -> Result<LogLevel> {
        Ok(self)
    }
}

impl IntoLogLevel for &str {
    fn into_level(self) -> Result<LogLevel> {
        self.parse()
    }
}

impl IntoLogLevel for String {
    fn into_level(self) -> Result<LogLevel> {
        self.parse()
    }
}

impl IntoLogLevel for u8 {
    fn into_level(self) -> Result<LogLevel> {
        LogLevel::from_rank(self)
    }
}
