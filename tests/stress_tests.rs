//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - No entries are lost when many threads log through shared handles
//! - Per-transport ordering holds for each producing thread
//! - The rate limiter's budget is exact under contention
//! - Close racing with producers neither deadlocks nor panics

use fanout_logger::core::DispatchMode;
use fanout_logger::prelude::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

#[test]
fn test_concurrent_producers_lose_nothing() {
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&delivered);

    let logger = Logger::builder()
        .transport(CallbackTransport::new("count", move |_: &LogEntry| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }))
        .transport(NullTransport)
        .build()
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.child(LogContext::new().with_field("thread", t));
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(format!("thread {} message {}", t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("producer panicked");
    }
    logger.flush();

    assert_eq!(delivered.load(Ordering::Relaxed), THREADS * PER_THREAD);
    assert_eq!(logger.stats().total_logged(), (THREADS * PER_THREAD) as u64);
}

#[test]
fn test_per_thread_order_preserved() {
    let seen: Arc<Mutex<Vec<(i64, i64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let logger = Logger::builder()
        .transport(CallbackTransport::new("order", move |entry: &LogEntry| {
            let metadata = &entry.context().metadata;
            let thread = metadata.get("thread").cloned();
            let seq = metadata.get("seq").cloned();
            if let (Some(LogData::Int(thread)), Some(LogData::Int(seq))) = (thread, seq) {
                sink.lock().push((thread, seq));
            }
            Ok(())
        }))
        .build()
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info_with(
                        "tick",
                        None,
                        Some(LogContext::new().with_field("thread", t).with_field("seq", i)),
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    logger.close();

    let seen = seen.lock();
    assert_eq!(seen.len(), THREADS * PER_THREAD);

    let mut last: HashMap<i64, i64> = HashMap::new();
    for &(thread, seq) in seen.iter() {
        if let Some(&previous) = last.get(&thread) {
            assert!(seq > previous, "thread {} went backwards", thread);
        }
        last.insert(thread, seq);
    }
}

#[test]
fn test_rate_limit_exact_under_contention() {
    let memory = Arc::new(MemoryTransport::with_capacity(10_000));
    let logger = Logger::builder()
        .rate_limit(RateLimitConfig::new(1_000, Duration::from_secs(3600)))
        .shared_transport(memory.clone())
        .build()
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(format!("{}-{}", t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush();

    assert_eq!(memory.len(), 1_000);
    assert_eq!(
        logger.stats().rate_limited(),
        (THREADS * PER_THREAD - 1_000) as u64
    );
}

#[test]
fn test_close_races_with_producers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("race.log");

    let logger = Logger::builder()
        .transport(FileTransport::new(&log_file).unwrap())
        .build()
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.warn(format!("{}:{}", t, i));
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(2));
    logger.close();

    for handle in handles {
        handle.join().expect("producer panicked after close");
    }

    let content = std::fs::read_to_string(&log_file).unwrap();
    let written = content.lines().count();
    assert!(written <= THREADS * PER_THREAD);
    assert!(content.lines().all(|line| line.contains("[WARN]")));
}

#[test]
fn test_inline_dispatch_under_load() {
    let first = Arc::new(MemoryTransport::with_capacity(5_000));
    let second = Arc::new(MemoryTransport::with_capacity(5_000));

    let logger = Logger::builder()
        .dispatch(DispatchMode::Inline)
        .shared_transport(first.clone())
        .shared_transport(second.clone())
        .build()
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    logger.error(format!("{}/{}", t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(first.len(), 1_000);
    assert_eq!(second.len(), 1_000);
}
