//! Transport that hands entries to a closure

use crate::core::{LogEntry, LoggerError, Result, Transport};
use std::sync::atomic::{AtomicBool, Ordering};

type Callback = Box<dyn Fn(&LogEntry) -> Result<()> + Send + Sync>;

/// Forwards each entry to a closure
///
/// Useful as an adapter to another system and for observing the pipeline in
/// tests.
///
/// # Example
///
/// ```
/// use fanout_logger::transports::CallbackTransport;
///
/// let transport = CallbackTransport::new("audit", |entry| {
///     println!("{} {}", entry.level(), entry.message());
///     Ok(())
/// });
/// ```
pub struct CallbackTransport {
    name: String,
    callback: Callback,
    closed: AtomicBool,
}

impl CallbackTransport {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&LogEntry) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callback: Box::new(callback),
            closed: AtomicBool::new(false),
        }
    }
}

impl Transport for CallbackTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LoggerError::TransportClosed(self.name.clone()));
        }
        (self.callback)(entry)
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_callback_receives_entries() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = CallbackTransport::new("cb", move |entry: &LogEntry| {
            sink.lock().push(entry.message().to_string());
            Ok(())
        });

        transport.write(&LogEntry::new(LogLevel::Info, "hello")).unwrap();
        assert_eq!(*seen.lock(), vec!["hello".to_string()]);

        transport.close().unwrap();
        assert!(transport.write(&LogEntry::new(LogLevel::Info, "late")).is_err());
    }

    #[test]
    fn test_callback_error_propagates() {
        let transport =
            CallbackTransport::new("cb", |_: &LogEntry| Err(LoggerError::other("refused")));
        assert!(transport.write(&LogEntry::new(LogLevel::Info, "x")).is_err());
    }
}
