//! Integration tests for fanout_logger
//!
//! These tests verify:
//! - File, stream and memory delivery through a full logger
//! - Fan-out isolation of failing transports
//! - Batched delivery ordering across failures
//! - Context layering, sanitization and JSON output
//! - Rate limiting, plugins, timers and lifecycle

use fanout_logger::core::config::DispatchMode;
use fanout_logger::prelude::*;
use fanout_logger::{info, RateLimitScope, SharedTransport};
use parking_lot::Mutex;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn capture() -> (Arc<Mutex<Vec<LogEntry>>>, CallbackTransport) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let transport = CallbackTransport::new("capture", move |entry: &LogEntry| {
        sink.lock().push(entry.clone());
        Ok(())
    });
    (seen, transport)
}

#[test]
fn test_file_transport_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("nested").join("app.log");

    let logger = Logger::builder()
        .level(LogLevel::Debug)
        .transport(FileTransport::new(&log_file).expect("Failed to create transport"))
        .build()
        .expect("Failed to build logger");

    for i in 0..25 {
        logger.info(format!("Message {}", i));
    }
    logger.debug("last");
    logger.close();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 26);
    assert!(lines[0].contains("[INFO] Message 0"));
    assert!(lines[25].contains("[DEBUG] last"));
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection.log");

    let logger = Logger::builder()
        .transport(FileTransport::new(&log_file).expect("Failed to create transport"))
        .build()
        .unwrap();

    logger.info("User login\nERROR [2024-10-17] Fake error injected");
    logger.close();

    let content = fs::read_to_string(&log_file).unwrap();
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
    assert!(content.contains("\\n"));
}

#[test]
fn test_json_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("app.json");

    let logger = Logger::builder()
        .environment("production")
        .formatter(JsonFormatter::new())
        .transport(FileTransport::new(&log_file).unwrap())
        .build()
        .unwrap();

    logger.warn_with(
        "disk almost full",
        Some(LogData::map([("free_mb", 512)])),
        Some(LogContext::new().with_component("storage")),
    );
    logger.close();

    let content = fs::read_to_string(&log_file).unwrap();
    let parsed: Value = serde_json::from_str(content.trim()).unwrap();

    assert_eq!(parsed["level"], "WARN");
    assert_eq!(parsed["message"], "disk almost full");
    assert_eq!(parsed["environment"], "production");
    assert_eq!(parsed["context"]["component"], "storage");
    assert_eq!(parsed["data"]["free_mb"], 512);

    let timestamp = parsed["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_stream_transport_with_logfmt() {
    let buffer = SharedBuffer::default();
    let logger = Logger::builder()
        .transport(
            StreamTransport::new("buffer", buffer.clone())
                .with_formatter(Arc::new(LogfmtFormatter::new())),
        )
        .build()
        .unwrap();

    logger.info("hello world");
    logger.close();

    let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
    assert!(output.contains("level=INFO"));
    assert!(output.contains("message=\"hello world\""));
}

#[test]
fn test_fan_out_isolation() {
    let failures = Arc::new(AtomicUsize::new(0));

    struct Failing {
        failures: Arc<AtomicUsize>,
    }

    impl Transport for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn write(&self, _entry: &LogEntry) -> Result<()> {
            Err(LoggerError::transport("failing", "connection refused"))
        }

        fn on_error(&self, _error: &LoggerError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicking;

    impl Transport for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn write(&self, _entry: &LogEntry) -> Result<()> {
            panic!("sink bug");
        }
    }

    let memory = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .transport(Failing {
            failures: Arc::clone(&failures),
        })
        .transport(Panicking)
        .shared_transport(memory.clone())
        .build()
        .unwrap();

    for i in 0..5 {
        logger.error(format!("entry {}", i));
    }
    logger.flush();

    assert_eq!(memory.len(), 5);
    assert_eq!(failures.load(Ordering::SeqCst), 5);
    assert_eq!(logger.stats().transport_errors(), 10);
    assert_eq!(logger.stats().total_logged(), 5);
}

#[test]
fn test_multi_transport_groups() {
    let first = Arc::new(MemoryTransport::new());
    let second = Arc::new(MemoryTransport::new());
    let group = MultiTransport::new(vec![
        first.clone() as SharedTransport,
        second.clone() as SharedTransport,
    ]);

    let logger = Logger::builder().transport(group).build().unwrap();
    logger.info("to both");
    logger.close();

    assert!(first.contains("to both"));
    assert!(second.contains("to both"));
    assert!(!first.is_ready());
}

struct FlakySender {
    calls: Mutex<Vec<Vec<String>>>,
    fail_first: AtomicUsize,
}

impl BatchSender for FlakySender {
    fn name(&self) -> &str {
        "flaky"
    }

    fn send(&self, batch: &[String]) -> Result<()> {
        let messages = batch
            .iter()
            .map(|line| {
                let parsed: Value = serde_json::from_str(line).unwrap();
                parsed["message"].as_str().unwrap().to_string()
            })
            .collect();
        self.calls.lock().push(messages);

        if self.fail_first.load(Ordering::SeqCst) > 0 {
            self.fail_first.fetch_sub(1, Ordering::SeqCst);
            return Err(LoggerError::transport("flaky", "503 Service Unavailable"));
        }
        Ok(())
    }
}

#[test]
fn test_batch_order_survives_failure() {
    let sender = FlakySender {
        calls: Mutex::new(Vec::new()),
        fail_first: AtomicUsize::new(1),
    };
    let config = BatchQueueConfig {
        batch_size: 2,
        flush_interval: Duration::from_secs(3600),
        on_error: Arc::new(|_: &LoggerError| {}),
        ..Default::default()
    };
    let transport = Arc::new(BatchTransport::with_config(sender, config).unwrap());

    let logger = Logger::builder()
        .dispatch(DispatchMode::Inline)
        .shared_transport(transport.clone())
        .build()
        .unwrap();

    for message in ["A", "B", "C", "D"] {
        logger.info(message);
    }
    logger.close();

    let calls = transport.sender().calls.lock().clone();
    assert_eq!(
        calls,
        vec![
            vec!["A".to_string(), "B".to_string()],
            vec!["A".to_string(), "B".to_string()],
            vec!["C".to_string(), "D".to_string()],
        ]
    );
    assert_eq!(transport.pending(), 0);
}

#[test]
fn test_batch_transport_drains_on_close() {
    let sender = FlakySender {
        calls: Mutex::new(Vec::new()),
        fail_first: AtomicUsize::new(0),
    };
    let transport = Arc::new(BatchTransport::new(sender).unwrap());
    let logger = Logger::builder()
        .shared_transport(transport.clone())
        .build()
        .unwrap();

    logger.info("one");
    logger.info("two");
    logger.close();

    let calls = transport.sender().calls.lock().clone();
    assert_eq!(calls, vec![vec!["one".to_string(), "two".to_string()]]);
    assert!(!transport.is_ready());
}

#[test]
fn test_close_against_failing_endpoint_reports_drops() {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let sender = FlakySender {
        calls: Mutex::new(Vec::new()),
        fail_first: AtomicUsize::new(usize::MAX),
    };
    let config = BatchQueueConfig {
        batch_size: 10,
        flush_interval: Duration::from_secs(3600),
        max_retries: 3,
        on_error: Arc::new(move |e: &LoggerError| sink.lock().push(e.to_string())),
        ..Default::default()
    };
    let transport = Arc::new(BatchTransport::with_config(sender, config).unwrap());
    let logger = Logger::builder()
        .shared_transport(transport.clone())
        .build()
        .unwrap();

    logger.info("first");
    logger.info("second");
    logger.close();

    assert_eq!(transport.sender().calls.lock().len(), 3);
    assert_eq!(transport.pending(), 0);
    let reports = reports.lock();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("dropped 2 item(s)"));
}

struct Warming {
    ready: std::sync::atomic::AtomicBool,
    seen: Arc<MemoryTransport>,
}

impl Transport for Warming {
    fn name(&self) -> &str {
        "warming"
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        self.seen.write(entry)
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[test]
fn test_not_ready_transport_receives_nothing() {
    let seen = Arc::new(MemoryTransport::new());
    let warming = Arc::new(Warming {
        ready: std::sync::atomic::AtomicBool::new(false),
        seen: seen.clone(),
    });
    let memory = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .shared_transport(warming.clone())
        .shared_transport(memory.clone())
        .build()
        .unwrap();

    logger.info("early");
    logger.flush();
    assert_eq!(seen.len(), 0);
    assert_eq!(memory.len(), 1);

    warming.ready.store(true, Ordering::SeqCst);
    logger.info("late");
    logger.flush();

    assert_eq!(seen.len(), 1);
    assert!(seen.contains("late"));
    assert_eq!(logger.stats().not_ready(), 1);
    assert_eq!(logger.stats().transport_errors(), 0);
}

#[test]
fn test_context_layers_and_child() {
    let (seen, transport) = capture();
    let logger = Logger::builder()
        .default_context(LogContext::new().with_field("service", "billing"))
        .transport(transport)
        .build()
        .unwrap();

    let child = logger.child(
        LogContext::new()
            .with_component("invoices")
            .with_field("service", "billing-worker"),
    );
    let guard = child.push_context(LogContext::new().with_user_id("u-7"));
    child.info("issued");
    drop(guard);
    child.info("done");
    logger.info("root");
    logger.flush();

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);

    let issued = seen[0].context();
    assert_eq!(issued.component.as_deref(), Some("invoices"));
    assert_eq!(issued.user_id.as_deref(), Some("u-7"));
    assert_eq!(
        issued.metadata.get("service"),
        Some(&LogData::from("billing-worker"))
    );

    assert!(seen[1].context().user_id.is_none());
    assert!(seen[2].context().component.is_none());
    assert_eq!(
        seen[2].context().metadata.get("service"),
        Some(&LogData::from("billing"))
    );
}

#[test]
fn test_sanitization_redacts_and_truncates() {
    let (seen, transport) = capture();
    let logger = Logger::builder()
        .sanitize(fanout_logger::core::SanitizeConfig {
            max_depth: 2,
            ..Default::default()
        })
        .transport(transport)
        .build()
        .unwrap();

    let payload: LogData = serde_json::json!({
        "user": { "name": "alice", "password": "hunter2" },
        "deep": { "a": { "b": { "c": 1 } } }
    })
    .into();
    logger.info_with("signup", Some(payload), None);
    logger.flush();

    let seen = seen.lock();
    let data = seen[0].data().unwrap();
    let user = data.get("user").unwrap();
    assert_eq!(user.get("password").and_then(LogData::as_str), Some("[REDACTED]"));
    assert_eq!(user.get("name").and_then(LogData::as_str), Some("alice"));

    let deep = data.get("deep").unwrap();
    assert_eq!(
        deep.get("a").and_then(LogData::as_str),
        Some("[Max Depth Exceeded]")
    );
}

#[test]
fn test_rate_limit_per_level() {
    let memory = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .rate_limit(RateLimitConfig {
            max: 3,
            window_ms: 60_000,
            scope: RateLimitScope::PerLevel,
        })
        .shared_transport(memory.clone())
        .build()
        .unwrap();

    for i in 0..4 {
        logger.info(format!("info {}", i));
    }
    logger.warn("warn still admitted");
    logger.flush();

    assert_eq!(memory.len(), 4);
    assert!(!memory.contains("info 3"));
    assert_eq!(logger.stats().rate_limited(), 1);
    assert!(logger.stats().drop_rate() > 0.0);
}

#[test]
fn test_plugins_in_registration_order() {
    let memory = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .plugin(LevelOverridePlugin::new().with_level("noisy", LogLevel::Error))
        .plugin(FieldInjectorPlugin::new().with_field("region", "eu-west-1"))
        .formatter(JsonFormatter::new())
        .shared_transport(memory.clone())
        .build()
        .unwrap();

    let noisy = logger.child(LogContext::new().with_component("noisy"));
    noisy.info("suppressed");
    noisy.error("kept");
    logger.flush();

    let entries = memory.entries();
    assert_eq!(entries.len(), 1);
    let parsed: Value = serde_json::from_str(&entries[0]).unwrap();
    assert_eq!(parsed["message"], "kept");
    assert_eq!(parsed["context"]["metadata"]["region"], "eu-west-1");
    assert_eq!(logger.stats().filtered(), 1);
}

#[test]
fn test_timer_logs_elapsed() {
    let (seen, transport) = capture();
    let logger = Logger::builder().transport(transport).build().unwrap();

    logger.time("import");
    std::thread::sleep(Duration::from_millis(5));
    let elapsed = logger.time_end("import").unwrap();
    logger.flush();

    assert!(elapsed >= 5.0);
    let seen = seen.lock();
    assert!(seen[0].message().starts_with("import: "));
    let timing = seen[0].context().timing.as_ref().unwrap();
    assert!(timing.duration.unwrap() >= 5.0);
    assert!(timing.start_time.is_some());
}

#[test]
fn test_close_is_idempotent() {
    let memory = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .shared_transport(memory.clone())
        .build()
        .unwrap();

    info!(logger, "before close");
    logger.close();
    logger.close();
    logger.info("after close");
    logger.flush();

    assert!(logger.is_closed());
    assert_eq!(memory.entries().len(), 1);
    assert!(matches!(
        logger.add_transport(Arc::new(NullTransport)),
        Err(LoggerError::LoggerClosed)
    ));
}

#[test]
fn test_config_from_json_drives_logger() {
    let config = LoggerConfig::from_json(
        r#"{
            "level": "warn",
            "environment": "staging",
            "default_context": { "component": "gateway" },
            "rate_limit": { "max": 10, "window_ms": 1000 }
        }"#,
    )
    .unwrap();

    let memory = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .config(config)
        .shared_transport(memory.clone())
        .build()
        .unwrap();

    logger.info("filtered");
    logger.warn("kept");
    logger.flush();

    assert_eq!(logger.level(), LogLevel::Warn);
    assert_eq!(memory.entries().len(), 1);
    assert!(memory.contains("[gateway] kept"));
}

#[test]
fn test_set_level_applies_to_children() {
    let memory = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .level(LogLevel::Error)
        .shared_transport(memory.clone())
        .build()
        .unwrap();
    let child = logger.child(LogContext::new().with_component("child"));

    child.info("dropped");
    logger.set_level("info").unwrap();
    child.info("kept");
    assert!(logger.set_level("chatty").is_err());
    logger.flush();

    assert_eq!(memory.entries().len(), 1);
    assert_eq!(child.level(), LogLevel::Info);
}
