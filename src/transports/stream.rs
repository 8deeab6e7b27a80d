//! Transport over any `Write` sink

use crate::core::{
    FormatterSlot, LogEntry, LoggerError, Result, SharedFormatter, SimpleFormatter, Transport,
};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

type Sink = Box<dyn Write + Send>;

/// Writes one formatted line per entry to a caller-supplied writer
///
/// # Example
///
/// ```
/// use fanout_logger::transports::StreamTransport;
///
/// let transport = StreamTransport::new("buffer", Vec::<u8>::new());
/// ```
pub struct StreamTransport {
    name: String,
    writer: Mutex<Option<Sink>>,
    formatter: FormatterSlot,
}

impl StreamTransport {
    pub fn new<W>(name: impl Into<String>, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            name: name.into(),
            writer: Mutex::new(Some(Box::new(writer))),
            formatter: FormatterSlot::with_default(Arc::new(SimpleFormatter::new())),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = FormatterSlot::explicit(formatter);
        self
    }
}

impl Transport for StreamTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        let line = self.formatter.format(entry);
        let mut guard = self.writer.lock();
        let writer = guard
            .as_mut()
            .ok_or_else(|| LoggerError::TransportClosed(self.name.clone()))?;
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(writer) = self.writer.lock().as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        match self.writer.lock().take() {
            Some(mut writer) => Ok(writer.flush()?),
            None => Ok(()),
        }
    }

    fn is_ready(&self) -> bool {
        self.writer.lock().is_some()
    }

    fn adopt_formatter(&self, formatter: SharedFormatter) {
        self.formatter.adopt(formatter);
    }
}
