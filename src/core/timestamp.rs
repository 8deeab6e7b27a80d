//! Timestamp rendering for text formatters

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// How text formatters render an entry's timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 keeping every sub-second digit the clock produced; parses back
    /// to the identical instant
    Rfc3339Exact,

    /// Wall-clock time only: `10:30:45.123`, for interactive consoles
    TimeOnly,

    /// `1736332245`
    UnixSeconds,

    /// `1736332245123`
    UnixMillis,

    /// `1736332245123456`
    UnixMicros,

    /// Any strftime-compatible format string
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339Exact => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            TimestampFormat::TimeOnly => datetime.format("%H:%M:%S%.3f").to_string(),
            TimestampFormat::UnixSeconds => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_format() {
        assert_eq!(
            TimestampFormat::Iso8601.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123Z"
        );
        assert_eq!(
            TimestampFormat::Iso8601Micros.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123456Z"
        );
    }

    #[test]
    fn test_rfc3339_exact_round_trips() {
        let dt = fixed_datetime();
        let rendered = TimestampFormat::Rfc3339Exact.format(&dt);
        let parsed = DateTime::parse_from_rfc3339(&rendered)
            .expect("valid rfc3339")
            .with_timezone(&Utc);
        assert_eq!(parsed, dt);
    }

    #[test]
    fn test_time_only() {
        assert_eq!(TimestampFormat::TimeOnly.format(&fixed_datetime()), "10:30:45.123");
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S +0000".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30:45 +0000");
    }

    #[test]
    fn test_unix_millis() {
        let millis: i64 = TimestampFormat::UnixMillis
            .format(&fixed_datetime())
            .parse()
            .expect("numeric");
        assert_eq!(millis, fixed_datetime().timestamp_millis());
        assert_eq!(
            TimestampFormat::UnixMicros.format(&fixed_datetime()),
            fixed_datetime().timestamp_micros().to_string()
        );
    }
}
