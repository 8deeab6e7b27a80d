//! Fan-out to several transports as one

use crate::core::transport::{deliver, isolated};
use crate::core::{LogEntry, LoggerError, Result, SharedFormatter, SharedTransport, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Writes each entry to every sub-transport concurrently
///
/// A failing sub-transport is reported through its own `on_error`, once per
/// entry, and never affects the others or the caller. Sub-transports that are
/// not ready are skipped without a report.
pub struct MultiTransport {
    transports: Vec<SharedTransport>,
    closed: AtomicBool,
}

impl MultiTransport {
    pub fn new(transports: Vec<SharedTransport>) -> Self {
        Self {
            transports,
            closed: AtomicBool::new(false),
        }
    }

    pub fn transports(&self) -> &[SharedTransport] {
        &self.transports
    }

    /// Run `op` against every sub-transport, concurrently when there are
    /// several, reporting failures through each sub-transport
    fn for_each<F>(&self, op: F)
    where
        F: Fn(&dyn Transport) -> Result<()> + Sync,
    {
        let run = |transport: &SharedTransport| {
            let transport = transport.as_ref();
            if let Err(e) = isolated(transport, || op(transport)) {
                transport.on_error(&e);
            }
        };

        let run = &run;
        match self.transports.as_slice() {
            [] => {}
            [only] => run(only),
            many => thread::scope(|scope| {
                for transport in many {
                    scope.spawn(move || run(transport));
                }
            }),
        }
    }
}

impl Transport for MultiTransport {
    fn name(&self) -> &str {
        "multi"
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LoggerError::TransportClosed(self.name().to_string()));
        }

        match self.transports.as_slice() {
            [] => {}
            [only] => {
                deliver(only.as_ref(), entry);
            }
            many => thread::scope(|scope| {
                for transport in many {
                    scope.spawn(move || deliver(transport.as_ref(), entry));
                }
            }),
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.for_each(|t| t.flush());
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.for_each(|t| t.close());
        Ok(())
    }

    /// Ready while any sub-transport is ready
    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && self.transports.iter().any(|t| t.is_ready())
    }

    fn adopt_formatter(&self, formatter: SharedFormatter) {
        for transport in &self.transports {
            transport.adopt_formatter(formatter.clone());
        }
    }
}
