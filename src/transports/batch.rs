//! Batched delivery to a remote endpoint

use crate::core::{
    AsyncBatchQueue, BatchProcessor, BatchQueueConfig, ErrorCallback, FormatterSlot,
    JsonFormatter, LogEntry, LoggerError, Result, SharedFormatter, Transport,
};
use crate::core::error::report_internal;
use std::sync::Arc;

/// Delivers one batch of formatted entries
///
/// Implemented by [`HttpSender`](super::HttpSender); vendor integrations
/// implement it to plug into [`BatchTransport`].
pub trait BatchSender: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Deliver `batch` in order. An error leaves the batch queued for retry.
    fn send(&self, batch: &[String]) -> Result<()>;
}

struct SenderProcessor<S>(Arc<S>);

impl<S: BatchSender> BatchProcessor<String> for SenderProcessor<S> {
    fn process(&self, batch: &[String]) -> Result<()> {
        self.0.send(batch)
    }
}

/// Buffers formatted entries and ships them through a [`BatchSender`]
///
/// Batches go out when `batch_size` entries are waiting or when the flush
/// timer fires. A failed batch is put back at the head of the queue and the
/// failure goes to the queue's `on_error`; `write` succeeds once the entry is
/// buffered. `close` stops the timer and drains whatever is left, giving each
/// batch its full retry budget.
///
/// Entries are rendered with [`JsonFormatter`] unless the logger-level or an
/// explicit formatter says otherwise.
pub struct BatchTransport<S: BatchSender> {
    name: String,
    sender: Arc<S>,
    queue: AsyncBatchQueue<String>,
    formatter: FormatterSlot,
    on_error: ErrorCallback,
}

impl<S: BatchSender> BatchTransport<S> {
    pub fn new(sender: S) -> Result<Self> {
        let name = sender.name().to_string();
        let config = BatchQueueConfig {
            on_error: Arc::new(move |e: &LoggerError| report_internal(&name, e)),
            ..Default::default()
        };
        Self::with_config(sender, config)
    }

    pub fn with_config(sender: S, config: BatchQueueConfig) -> Result<Self> {
        let sender = Arc::new(sender);
        let on_error = Arc::clone(&config.on_error);
        let queue = AsyncBatchQueue::new(SenderProcessor(Arc::clone(&sender)), config)?;

        Ok(Self {
            name: sender.name().to_string(),
            sender,
            queue,
            formatter: FormatterSlot::with_default(Arc::new(JsonFormatter::new())),
            on_error,
        })
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = FormatterSlot::explicit(formatter);
        self
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Entries waiting for delivery
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<S: BatchSender> Transport for BatchTransport<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        if self.queue.is_closed() {
            return Err(LoggerError::TransportClosed(self.name.clone()));
        }

        match self.queue.add(self.formatter.format(entry)) {
            Ok(()) => Ok(()),
            Err(LoggerError::LoggerClosed) => Err(LoggerError::TransportClosed(self.name.clone())),
            // The entry is queued; only the inline flush failed
            Err(e) => {
                (self.on_error)(&e);
                Ok(())
            }
        }
    }

    fn flush(&self) -> Result<()> {
        self.queue.force_flush()
    }

    fn close(&self) -> Result<()> {
        self.queue.shutdown()
    }

    fn is_ready(&self) -> bool {
        !self.queue.is_closed()
    }

    fn adopt_formatter(&self, formatter: SharedFormatter) {
        self.formatter.adopt(formatter);
    }
}
