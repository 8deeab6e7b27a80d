//! Console transport implementation

use crate::core::{
    ConsoleFormatter, FormatterSlot, LogEntry, LoggerError, Result, SharedFormatter, Transport,
};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Writes ERROR and WARN to stderr, everything else to stdout
pub struct ConsoleTransport {
    formatter: FormatterSlot,
    closed: AtomicBool,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            formatter: FormatterSlot::with_default(Arc::new(ConsoleFormatter::new())),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            formatter: FormatterSlot::with_default(Arc::new(ConsoleFormatter::with_colors(
                use_colors,
            ))),
            closed: AtomicBool::new(false),
        }
    }

    /// Use `formatter` regardless of the logger-level formatter
    ///
    /// # Example
    ///
    /// ```
    /// use fanout_logger::transports::ConsoleTransport;
    /// use fanout_logger::JsonFormatter;
    /// use std::sync::Arc;
    ///
    /// let transport = ConsoleTransport::with_formatter(Arc::new(JsonFormatter::new()));
    /// ```
    pub fn with_formatter(formatter: SharedFormatter) -> Self {
        Self {
            formatter: FormatterSlot::explicit(formatter),
            closed: AtomicBool::new(false),
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LoggerError::TransportClosed(self.name().to_string()));
        }

        let output = self.formatter.format(entry);
        if entry.level().is_error_stream() {
            writeln!(std::io::stderr().lock(), "{}", output)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", output)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.flush()
    }

    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    fn adopt_formatter(&self, formatter: SharedFormatter) {
        self.formatter.adopt(formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_write_after_close_rejected() {
        let transport = ConsoleTransport::with_colors(false);
        transport
            .write(&LogEntry::new(LogLevel::Info, "console smoke test"))
            .unwrap();

        transport.close().unwrap();
        transport.close().unwrap();
        assert!(!transport.is_ready());
        assert!(matches!(
            transport.write(&LogEntry::new(LogLevel::Info, "late")),
            Err(LoggerError::TransportClosed(_))
        ));
    }
}
