//! File transport implementation

use crate::core::{
    FormatterSlot, LogEntry, LoggerError, Result, SharedFormatter, SimpleFormatter, Transport,
};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Buffered append-only file sink
pub struct FileTransport {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
    formatter: FormatterSlot,
}

impl FileTransport {
    /// Open `path` for appending, creating it and its parent directories
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fanout_logger::transports::FileTransport;
    ///
    /// let transport = FileTransport::new("/var/log/app/app.log")?;
    /// # Ok::<(), fanout_logger::LoggerError>(())
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    format!("cannot create {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("cannot open {}", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(Some(BufWriter::new(file))),
            formatter: FormatterSlot::with_default(Arc::new(SimpleFormatter::new())),
        })
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = FormatterSlot::explicit(formatter);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for FileTransport {
    fn name(&self) -> &str {
        "file"
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        let mut line = self.formatter.format(entry);
        line.push('\n');

        let mut guard = self.writer.lock();
        let writer = guard
            .as_mut()
            .ok_or_else(|| LoggerError::TransportClosed(self.name().to_string()))?;
        writer.write_all(line.as_bytes())?;
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

impl Drop for FileTransport {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
