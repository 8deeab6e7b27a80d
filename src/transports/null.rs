//! Transport that discards everything

use crate::core::{LogEntry, Result, Transport};

/// Accepts every entry and drops it; always ready
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl NullTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for NullTransport {
    fn name(&self) -> &str {
        "null"
    }

    fn write(&self, _entry: &LogEntry) -> Result<()> {
        Ok(())
    }
}
