//! Size- and time-triggered batching
//!
//! `AsyncBatchQueue` buffers items and hands them to a [`BatchProcessor`] in
//! chunks of `batch_size`, either inline when the buffer fills or from a
//! background timer thread every `flush_interval`.
//!
//! Only one flush runs at a time. A batch the processor rejects, or panics
//! on, goes back to the front of the queue in its original order, so
//! delivery order is never reshuffled by retries.

use super::error::{panic_message, report_internal, LoggerError, Result};
use super::transport::catch_isolated;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Receives one batch at a time
pub trait BatchProcessor<T>: Send + Sync {
    fn process(&self, batch: &[T]) -> Result<()>;
}

impl<T, F> BatchProcessor<T> for F
where
    F: Fn(&[T]) -> Result<()> + Send + Sync,
{
    fn process(&self, batch: &[T]) -> Result<()> {
        self(batch)
    }
}

/// What happens to a batch once its retry budget is spent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExhaustedPolicy {
    /// Discard the batch and report it
    #[default]
    Drop,
    /// Keep the batch at the head of the queue and report it
    Requeue,
}

pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

#[derive(Clone)]
pub struct BatchQueueConfig {
    pub batch_size: usize,
    pub flush_interval: Duration,
    /// Consecutive failures of the head batch before `exhausted` applies
    pub max_retries: u32,
    pub exhausted: ExhaustedPolicy,
    /// Oldest items are evicted beyond this many
    pub max_queue_size: Option<usize>,
    pub on_error: ErrorCallback,
}

impl Default for BatchQueueConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            flush_interval: Duration::from_secs(5),
            max_retries: 3,
            exhausted: ExhaustedPolicy::Drop,
            max_queue_size: Some(10_000),
            on_error: Arc::new(|e| report_internal("batch queue", e)),
        }
    }
}

impl BatchQueueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LoggerError::config("batch_queue", "batch_size must be positive"));
        }
        if self.flush_interval.is_zero() {
            return Err(LoggerError::config(
                "batch_queue",
                "flush_interval must be positive",
            ));
        }
        if matches!(self.max_queue_size, Some(max) if max < self.batch_size) {
            return Err(LoggerError::config(
                "batch_queue",
                "max_queue_size must be at least batch_size",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BatchQueueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchQueueConfig")
            .field("batch_size", &self.batch_size)
            .field("flush_interval", &self.flush_interval)
            .field("max_retries", &self.max_retries)
            .field("exhausted", &self.exhausted)
            .field("max_queue_size", &self.max_queue_size)
            .finish_non_exhaustive()
    }
}

struct Shared<T> {
    queue: Mutex<VecDeque<T>>,
    /// Held for the whole of a flush
    processing: Mutex<()>,
    failures: AtomicU32,
    closed: AtomicBool,
    processor: Box<dyn BatchProcessor<T>>,
    config: BatchQueueConfig,
}

/// What one `flush_once` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flushed {
    /// Queue empty, or another flush held the lock and we did not wait
    Nothing,
    Delivered,
    /// Retry budget spent; the items were discarded and reported
    Dropped(usize),
}

impl<T: Send + 'static> Shared<T> {
    /// Hand a batch to the processor, turning a panic into an error
    fn process(&self, batch: &[T]) -> Result<()> {
        match catch_isolated(|| self.processor.process(batch)) {
            Ok(result) => result,
            Err(payload) => Err(LoggerError::other(format!(
                "batch processor panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    /// Process at most one batch
    ///
    /// On failure the batch goes back to the head of the queue until
    /// `max_retries` consecutive failures; then the exhausted policy applies.
    /// With `finalizing` set an exhausted batch is always dropped, since
    /// nothing will retry it later.
    fn flush_once(&self, wait: bool, finalizing: bool) -> Result<Flushed> {
        let _guard = if wait {
            self.processing.lock()
        } else {
            match self.processing.try_lock() {
                Some(guard) => guard,
                None => return Ok(Flushed::Nothing),
            }
        };

        let batch: Vec<T> = {
            let mut queue = self.queue.lock();
            let n = self.config.batch_size.min(queue.len());
            queue.drain(..n).collect()
        };
        if batch.is_empty() {
            return Ok(Flushed::Nothing);
        }

        let error = match self.process(&batch) {
            Ok(()) => {
                self.failures.store(0, Ordering::Relaxed);
                return Ok(Flushed::Delivered);
            }
            Err(e) => e,
        };

        let attempts = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if attempts >= self.config.max_retries.max(1) {
            self.failures.store(0, Ordering::Relaxed);
            if finalizing || self.config.exhausted == ExhaustedPolicy::Drop {
                (self.config.on_error)(&LoggerError::batch_flush(
                    attempts,
                    format!("dropped {} item(s): {}", batch.len(), error),
                ));
                return Ok(Flushed::Dropped(batch.len()));
            }
        }

        self.requeue(batch);
        Err(LoggerError::batch_flush(attempts, error.to_string()))
    }

    fn requeue(&self, batch: Vec<T>) {
        let mut queue = self.queue.lock();
        for item in batch.into_iter().rev() {
            queue.push_front(item);
        }
    }

    /// Timer path: drain what is there, report instead of propagating
    fn tick(&self) {
        loop {
            match self.flush_once(false, false) {
                Ok(Flushed::Nothing) => break,
                Ok(_) => continue,
                Err(e) => {
                    (self.config.on_error)(&e);
                    break;
                }
            }
        }
    }

    /// Deliver everything left, spending each batch's full retry budget
    ///
    /// Returns how many items were dropped.
    fn drain_final(&self) -> usize {
        let mut dropped = 0;
        loop {
            match self.flush_once(true, true) {
                Ok(Flushed::Nothing) => return dropped,
                Ok(Flushed::Delivered) => {}
                Ok(Flushed::Dropped(n)) => dropped += n,
                // Requeued; the next pass retries it
                Err(_) => {}
            }
        }
    }
}

/// Batching buffer with a background flush timer
pub struct AsyncBatchQueue<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> AsyncBatchQueue<T> {
    pub fn new<P>(processor: P, config: BatchQueueConfig) -> Result<Self>
    where
        P: BatchProcessor<T> + 'static,
    {
        config.validate()?;
        let interval = config.flush_interval;

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            processing: Mutex::new(()),
            failures: AtomicU32::new(0),
            closed: AtomicBool::new(false),
            processor: Box::new(processor),
            config,
        });

        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let timer_shared = Arc::clone(&shared);
        let timer = thread::Builder::new()
            .name("batch-flush".to_string())
            .spawn(move || loop {
                match shutdown_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(payload) = catch_isolated(|| timer_shared.tick()) {
                            report_internal(
                                "batch queue",
                                &format!("flush tick panicked: {}", panic_message(payload.as_ref())),
                            );
                        }
                    }
                    // Explicit stop or queue dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| {
                LoggerError::io_operation("spawning batch flush timer", "thread spawn failed", e)
            })?;

        Ok(Self {
            shared,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            timer: Mutex::new(Some(timer)),
        })
    }

    /// Buffer an item, flushing inline once a full batch is waiting
    ///
    /// A flush failure is returned; the failed batch stays queued.
    pub fn add(&self, item: T) -> Result<()> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(LoggerError::LoggerClosed);
        }

        let (len, evicted) = {
            let mut queue = self.shared.queue.lock();
            queue.push_back(item);
            let evicted = match self.shared.config.max_queue_size {
                Some(max) if queue.len() > max => queue.pop_front().is_some(),
                _ => false,
            };
            (queue.len(), evicted)
        };

        if evicted {
            (self.shared.config.on_error)(&LoggerError::other(
                "batch queue full, oldest item evicted",
            ));
        }

        if len >= self.shared.config.batch_size {
            self.shared.flush_once(false, false)?;
        }
        Ok(())
    }

    /// Drain the queue, waiting for any in-flight flush first
    ///
    /// Stops at the first processor failure and returns it.
    pub fn force_flush(&self) -> Result<()> {
        while self.shared.flush_once(true, false)? != Flushed::Nothing {}
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    fn stop_timer(&self) {
        drop(self.shutdown_tx.lock().take());
        if let Some(handle) = self.timer.lock().take() {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] batch flush timer panicked");
            }
        }
    }

    /// Stop the timer and drain; later calls do nothing
    ///
    /// Each remaining batch gets up to `max_retries` attempts. Batches that
    /// still fail are dropped whatever the exhausted policy, each reported
    /// through `on_error`, and the total comes back as an error.
    pub fn shutdown(&self) -> Result<()> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.stop_timer();

        match self.shared.drain_final() {
            0 => Ok(()),
            dropped => Err(LoggerError::batch_flush(
                self.shared.config.max_retries.max(1),
                format!("{} item(s) abandoned at shutdown", dropped),
            )),
        }
    }
}

impl<T: Send + 'static> Drop for AsyncBatchQueue<T> {
    fn drop(&mut self) {
        // Dropped batches were already reported one by one
        let _ = self.shutdown();
    }
}
