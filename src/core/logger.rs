//! Main logger implementation
//!
//! A [`Logger`] is a cheap handle: cloning it or deriving a child shares the
//! configuration, transports, plugins, rate limiter, timers and statistics.
//! Each call runs the level gate, the rate limiter, entry construction and
//! the plugin hooks on the caller's thread, then fans the entry out to every
//! transport.

use super::config::{DispatchMode, LoggerConfig, PerformanceConfig, SanitizeConfig};
use super::error::{panic_message, report_internal, LoggerError, Result};
use super::formatter::{Formatter, SharedFormatter};
use super::log_context::{ContextGuard, ContextStack, LogContext, Timing};
use super::log_data::{LogData, Sanitizer};
use super::log_entry::{LogEntry, Source};
use super::log_level::{IntoLogLevel, LogLevel};
use super::metrics::{MetricKind, MetricSample, MetricsBuffer};
use super::plugin::{Plugin, SharedPlugin};
use super::process_hooks;
use super::rate_limiter::{RateLimitConfig, RateLimiter};
use super::stats::LoggerStats;
use super::transport::{catch_isolated, deliver, isolated, Delivery, SharedTransport, Transport};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest a flush or close waits on the transports before giving up
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

enum Command {
    Write(Arc<LogEntry>),
    Flush(Sender<usize>),
    Close(Sender<usize>),
}

struct Worker {
    sender: Sender<Command>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// A transport plus, in threaded mode, the worker that feeds it
struct Route {
    transport: SharedTransport,
    worker: Option<Worker>,
}

impl Route {
    fn new(
        index: usize,
        transport: SharedTransport,
        mode: DispatchMode,
        stats: &Arc<LoggerStats>,
    ) -> Result<Self> {
        let worker = match mode {
            DispatchMode::Inline => None,
            DispatchMode::Threaded => Some(Self::spawn_worker(
                index,
                Arc::clone(&transport),
                Arc::clone(stats),
            )?),
        };
        Ok(Self { transport, worker })
    }

    /// Per-transport worker: entries are written in the order they were sent
    fn spawn_worker(
        index: usize,
        transport: SharedTransport,
        stats: Arc<LoggerStats>,
    ) -> Result<Worker> {
        let (sender, receiver) = unbounded::<Command>();
        let handle = thread::Builder::new()
            .name(format!("log-{}", transport.name()))
            .spawn(move || {
                for command in receiver.iter() {
                    match command {
                        Command::Write(entry) => {
                            record_delivery(&stats, deliver(transport.as_ref(), &entry));
                        }
                        Command::Flush(ack) => {
                            Self::run(transport.as_ref(), |t| t.flush());
                            let _ = ack.send(index);
                        }
                        Command::Close(ack) => {
                            Self::run(transport.as_ref(), |t| t.close());
                            let _ = ack.send(index);
                            break;
                        }
                    }
                }
            })
            .map_err(|e| {
                LoggerError::io_operation("spawning transport worker", "thread spawn failed", e)
            })?;

        Ok(Worker {
            sender,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Flush or close with panic isolation, reporting through the transport
    fn run(transport: &dyn Transport, op: impl FnOnce(&dyn Transport) -> Result<()>) {
        if let Err(e) = isolated(transport, || op(transport)) {
            transport.on_error(&e);
        }
    }
}

fn record_delivery(stats: &LoggerStats, outcome: Delivery) {
    match outcome {
        Delivery::Written => {}
        Delivery::NotReady => {
            stats.record_not_ready();
        }
        Delivery::Failed => {
            stats.record_transport_error();
        }
    }
}

/// Wait until `expected` acknowledgements arrive or the deadline passes
///
/// Returns the indices that acknowledged.
fn await_acks(acks: &Receiver<usize>, expected: usize, what: &str) -> Vec<usize> {
    let deadline = Instant::now() + DEFAULT_SHUTDOWN_TIMEOUT;
    let mut acked = Vec::with_capacity(expected);
    while acked.len() < expected {
        match acks.recv_deadline(deadline) {
            Ok(index) => acked.push(index),
            Err(_) => {
                eprintln!(
                    "[LOGGER WARNING] {} of {} transport(s) did not {} within {:?}",
                    expected - acked.len(),
                    expected,
                    what,
                    DEFAULT_SHUTDOWN_TIMEOUT
                );
                break;
            }
        }
    }
    acked
}

/// Start mark for `Logger::time`
#[derive(Debug, Clone, Copy)]
struct TimerMark {
    started: Instant,
    started_ms: i64,
    memory: Option<i64>,
}

/// Resident set size of this process, where the platform exposes it
fn resident_memory_bytes() -> Option<i64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
        let kb: i64 = line.split_whitespace().nth(1)?.parse().ok()?;
        Some(kb * 1024)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

struct RateLimit {
    limiter: RateLimiter,
    config: RateLimitConfig,
}

/// State shared by every handle of one logger
struct LoggerShared {
    config: LoggerConfig,
    level: AtomicU8,
    routes: RwLock<Vec<Route>>,
    plugins: RwLock<Vec<SharedPlugin>>,
    formatter: Option<SharedFormatter>,
    rate_limit: Option<RateLimit>,
    sanitizer: Sanitizer,
    stats: Arc<LoggerStats>,
    metrics: MetricsBuffer,
    timers: Mutex<HashMap<String, TimerMark>>,
    closed: AtomicBool,
}

impl LoggerShared {
    fn new(config: LoggerConfig, formatter: Option<SharedFormatter>) -> Result<Self> {
        config.validate()?;

        let rate_limit = match config.rate_limit {
            Some(ref rate_config) => Some(RateLimit {
                limiter: RateLimiter::from_config(rate_config)?,
                config: rate_config.clone(),
            }),
            None => None,
        };

        Ok(Self {
            level: AtomicU8::new(config.level.rank()),
            routes: RwLock::new(Vec::new()),
            plugins: RwLock::new(Vec::new()),
            formatter,
            rate_limit,
            sanitizer: config.sanitize.sanitizer(),
            stats: Arc::new(LoggerStats::new()),
            metrics: MetricsBuffer::new(config.performance.enabled, config.performance.sample_rate),
            timers: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            config,
        })
    }

    fn level(&self) -> LogLevel {
        LogLevel::from_rank(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn add_transport(&self, transport: SharedTransport) -> Result<()> {
        if let Some(ref formatter) = self.formatter {
            transport.adopt_formatter(Arc::clone(formatter));
        }
        let mut routes = self.routes.write();
        let route = Route::new(routes.len(), transport, self.config.dispatch, &self.stats)?;
        routes.push(route);
        Ok(())
    }

    fn add_plugin(&self, plugin: SharedPlugin) -> Result<()> {
        let init = match catch_isolated(|| plugin.init(&self.config)) {
            Ok(result) => result,
            Err(payload) => Err(LoggerError::other(format!(
                "init panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };
        if let Err(e) = init {
            report_internal(plugin.name(), &e);
            return Err(e);
        }
        self.plugins.write().push(plugin);
        Ok(())
    }

    /// Run `before_transport` hooks; `None` means a plugin dropped the entry
    fn run_before_hooks(&self, plugins: &[SharedPlugin], mut entry: LogEntry) -> Option<LogEntry> {
        for plugin in plugins {
            entry = match catch_isolated(|| plugin.before_transport(entry)) {
                Ok(Some(entry)) => entry,
                Ok(None) => return None,
                Err(payload) => {
                    report_internal(
                        plugin.name(),
                        &format!("before_transport panicked: {}", panic_message(payload.as_ref())),
                    );
                    return None;
                }
            };
        }
        Some(entry)
    }

    fn run_after_hooks(&self, plugins: &[SharedPlugin], entry: &LogEntry) {
        for plugin in plugins {
            if let Err(payload) = catch_isolated(|| plugin.after_transport(entry)) {
                report_internal(
                    plugin.name(),
                    &format!("after_transport panicked: {}", panic_message(payload.as_ref())),
                );
            }
        }
    }

    fn dispatch(&self, entry: LogEntry) {
        let plugins: Vec<SharedPlugin> = self.plugins.read().clone();

        let Some(entry) = self.run_before_hooks(&plugins, entry) else {
            self.stats.record_filtered();
            return;
        };
        self.stats.record_logged();

        let entry = Arc::new(entry);
        {
            let routes = self.routes.read();
            match self.config.dispatch {
                DispatchMode::Threaded => {
                    for route in routes.iter() {
                        if let Some(ref worker) = route.worker {
                            // A closed worker means the logger is shutting down
                            let _ = worker.sender.send(Command::Write(Arc::clone(&entry)));
                        }
                    }
                }
                DispatchMode::Inline => self.write_inline(&routes, &entry),
            }
        }

        self.run_after_hooks(&plugins, &entry);
    }

    fn write_inline(&self, routes: &[Route], entry: &LogEntry) {
        let write = |route: &Route| {
            record_delivery(&self.stats, deliver(route.transport.as_ref(), entry));
        };

        match routes {
            [] => {}
            [only] => write(only),
            many => {
                let write = &write;
                thread::scope(|scope| {
                    for route in many {
                        scope.spawn(move || write(route));
                    }
                });
            }
        }
    }

    /// Flush every transport, tolerating failures
    fn flush(&self) {
        let routes = self.routes.read();
        match self.config.dispatch {
            DispatchMode::Threaded => {
                let (ack_tx, ack_rx) = unbounded();
                let sent = routes
                    .iter()
                    .filter_map(|route| route.worker.as_ref())
                    .filter(|worker| worker.sender.send(Command::Flush(ack_tx.clone())).is_ok())
                    .count();
                await_acks(&ack_rx, sent, "flush");
            }
            DispatchMode::Inline => Self::each_concurrently(&routes, |t| t.flush()),
        }
    }

    fn each_concurrently<F>(routes: &[Route], op: F)
    where
        F: Fn(&dyn Transport) -> Result<()> + Sync,
    {
        let op = &op;
        thread::scope(|scope| {
            for route in routes {
                scope.spawn(move || Route::run(route.transport.as_ref(), op));
            }
        });
    }

    /// Close transports and destroy plugins; runs once
    fn shutdown(&self) {
        let routes = self.routes.read();
        match self.config.dispatch {
            DispatchMode::Threaded => {
                let (ack_tx, ack_rx) = unbounded();
                let sent = routes
                    .iter()
                    .filter_map(|route| route.worker.as_ref())
                    .filter(|worker| worker.sender.send(Command::Close(ack_tx.clone())).is_ok())
                    .count();

                for index in await_acks(&ack_rx, sent, "close") {
                    let handle = routes
                        .get(index)
                        .and_then(|route| route.worker.as_ref())
                        .and_then(|worker| worker.handle.lock().take());
                    if let Some(handle) = handle {
                        if handle.join().is_err() {
                            eprintln!("[LOGGER ERROR] Transport worker #{} panicked", index);
                        }
                    }
                }
            }
            DispatchMode::Inline => Self::each_concurrently(&routes, |t| t.close()),
        }
        drop(routes);

        for plugin in self.plugins.read().iter() {
            if let Err(payload) = catch_isolated(|| plugin.destroy()) {
                report_internal(
                    plugin.name(),
                    &format!("destroy panicked: {}", panic_message(payload.as_ref())),
                );
            }
        }

        let limited = self.stats.rate_limited();
        if limited > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger closing with {} rate-limited calls (drop rate: {:.2}%)",
                limited,
                self.stats.drop_rate()
            );
        }
    }
}

impl Drop for LoggerShared {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.shutdown();
        }
    }
}

/// Handle to a logging pipeline
///
/// # Example
///
/// ```
/// use fanout_logger::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemoryTransport::new());
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .shared_transport(memory.clone())
///     .build()?;
///
/// let db = logger.child(LogContext::new().with_component("db"));
/// db.info("connected");
///
/// logger.flush();
/// assert!(memory.contains("[db] connected"));
/// # Ok::<(), fanout_logger::LoggerError>(())
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<LoggerShared>,
    context: LogContext,
    stack: ContextStack,
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn from_config(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::new().config(config).build()
    }

    /// A logger that accepts every call and does nothing
    pub fn disabled() -> Self {
        let config = LoggerConfig {
            enabled: false,
            ..LoggerConfig::default()
        };
        let shared = match LoggerShared::new(config, None) {
            Ok(shared) => shared,
            // Default configuration always validates
            Err(e) => unreachable!("default configuration rejected: {}", e),
        };
        Self::from_shared(Arc::new(shared))
    }

    fn from_shared(shared: Arc<LoggerShared>) -> Self {
        Self {
            shared,
            context: LogContext::default(),
            stack: ContextStack::new(),
        }
    }

    /// Resolve the level, gate it, and log with the caller's location
    ///
    /// Fails only when `level` does not name a level. Calls on a closed or
    /// disabled logger, filtered calls and rate-limited calls all return
    /// `Ok(())`.
    #[track_caller]
    pub fn log<L: IntoLogLevel>(
        &self,
        level: L,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) -> Result<()> {
        self.log_at(level, message, data, context, Source::caller())
    }

    /// [`log`](Self::log) with an explicit call site; used by the macros
    pub fn log_at<L: IntoLogLevel>(
        &self,
        level: L,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
        source: Source,
    ) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }
        let level = level.into_level()?;
        self.emit(level, message.into(), data, context, source);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.shared.config.enabled && !self.shared.closed.load(Ordering::Acquire)
    }

    fn emit(
        &self,
        level: LogLevel,
        message: String,
        data: Option<LogData>,
        context: Option<LogContext>,
        source: Source,
    ) {
        if !self.is_active() || !LogLevel::should_log(self.shared.level(), level) {
            return;
        }

        if let Some(ref rate_limit) = self.shared.rate_limit {
            if !rate_limit.limiter.is_allowed(rate_limit.config.key_for(level)) {
                self.shared.stats.record_rate_limited();
                return;
            }
        }

        let entry = self.build_entry(level, message, data, context, source);
        self.shared.dispatch(entry);
    }

    fn build_entry(
        &self,
        level: LogLevel,
        message: String,
        data: Option<LogData>,
        context: Option<LogContext>,
        source: Source,
    ) -> LogEntry {
        let shared = &self.shared;
        let mut merged = self.effective_context();
        if let Some(ref context) = context {
            merged = merged.merge(context);
        }
        merged.metadata = shared.sanitizer.sanitize_map(&merged.metadata);

        LogEntry::builder(level, message)
            .environment(shared.config.environment.as_str())
            .context(merged)
            .data(data.map(|d| shared.sanitizer.sanitize(&d)))
            .source(source)
            .build()
    }

    /// Context every entry from this handle starts from
    pub fn effective_context(&self) -> LogContext {
        self.stack
            .apply(self.shared.config.default_context.merge(&self.context))
    }

    /// A handle whose entries also carry `context`
    ///
    /// The child shares everything with its parent except its context, which
    /// is the parent's effective context with `context` merged on top.
    pub fn child(&self, context: LogContext) -> Logger {
        Logger {
            shared: Arc::clone(&self.shared),
            context: self.effective_context().merge(&context),
            stack: ContextStack::new(),
        }
    }

    /// Apply `context` to this handle's entries until the guard drops
    pub fn push_context(&self, context: LogContext) -> ContextGuard {
        self.stack.push(context)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message.into(), None, None, Source::caller());
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message.into(), None, None, Source::caller());
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message.into(), None, None, Source::caller());
    }

    #[track_caller]
    pub fn http(&self, message: impl Into<String>) {
        self.emit(LogLevel::Http, message.into(), None, None, Source::caller());
    }

    #[track_caller]
    pub fn verbose(&self, message: impl Into<String>) {
        self.emit(LogLevel::Verbose, message.into(), None, None, Source::caller());
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message.into(), None, None, Source::caller());
    }

    #[track_caller]
    pub fn silly(&self, message: impl Into<String>) {
        self.emit(LogLevel::Silly, message.into(), None, None, Source::caller());
    }

    #[track_caller]
    pub fn error_with(
        &self,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) {
        self.emit(LogLevel::Error, message.into(), data, context, Source::caller());
    }

    #[track_caller]
    pub fn warn_with(
        &self,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) {
        self.emit(LogLevel::Warn, message.into(), data, context, Source::caller());
    }

    #[track_caller]
    pub fn info_with(
        &self,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) {
        self.emit(LogLevel::Info, message.into(), data, context, Source::caller());
    }

    #[track_caller]
    pub fn http_with(
        &self,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) {
        self.emit(LogLevel::Http, message.into(), data, context, Source::caller());
    }

    #[track_caller]
    pub fn verbose_with(
        &self,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) {
        self.emit(LogLevel::Verbose, message.into(), data, context, Source::caller());
    }

    #[track_caller]
    pub fn debug_with(
        &self,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) {
        self.emit(LogLevel::Debug, message.into(), data, context, Source::caller());
    }

    #[track_caller]
    pub fn silly_with(
        &self,
        message: impl Into<String>,
        data: Option<LogData>,
        context: Option<LogContext>,
    ) {
        self.emit(LogLevel::Silly, message.into(), data, context, Source::caller());
    }

    /// Start a timer; a second call with the same label restarts it
    pub fn time(&self, label: impl Into<String>) {
        if !self.shared.config.performance.enabled {
            return;
        }
        let mark = TimerMark {
            started: Instant::now(),
            started_ms: chrono::Utc::now().timestamp_millis(),
            memory: resident_memory_bytes(),
        };
        self.shared.timers.lock().insert(label.into(), mark);
    }

    /// Stop a timer and log `"<label>: <ms>ms"` at INFO with timing attached
    ///
    /// Returns the elapsed milliseconds. An unknown label logs a warning and
    /// returns `None`.
    #[track_caller]
    pub fn time_end(&self, label: &str) -> Option<f64> {
        if !self.shared.config.performance.enabled {
            return None;
        }
        let source = Source::caller();

        let Some(mark) = self.shared.timers.lock().remove(label) else {
            self.emit(
                LogLevel::Warn,
                format!("Timer '{}' does not exist", label),
                None,
                None,
                source,
            );
            return None;
        };

        let duration = mark.started.elapsed().as_secs_f64() * 1000.0;
        let memory = resident_memory_bytes()
            .zip(mark.memory)
            .map(|(now, then)| now - then);
        let timing = Timing {
            start_time: Some(mark.started_ms),
            duration: Some(duration),
            memory,
        };

        self.emit(
            LogLevel::Info,
            format!("{}: {:.2}ms", label, duration),
            None,
            Some(LogContext::new().with_timing(timing)),
            source,
        );
        Some(duration)
    }

    fn record_metric(&self, name: &str, value: f64, kind: MetricKind, tags: &[(&str, &str)]) {
        let sample = MetricSample::new(name, value, kind).with_tags(tags.iter().copied());
        self.shared.metrics.record(sample);
    }

    /// # Example
    ///
    /// ```
    /// # use fanout_logger::prelude::*;
    /// # let logger = Logger::builder().transport(NullTransport).build()?;
    /// logger.counter("requests", 1.0, &[("route", "/users")]);
    /// logger.gauge("queue_depth", 12.0, &[]);
    /// # Ok::<(), fanout_logger::LoggerError>(())
    /// ```
    pub fn counter(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.record_metric(name, value, MetricKind::Counter, tags);
    }

    pub fn gauge(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.record_metric(name, value, MetricKind::Gauge, tags);
    }

    pub fn histogram(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.record_metric(name, value, MetricKind::Histogram, tags);
    }

    pub fn metric_samples(&self) -> Vec<MetricSample> {
        self.shared.metrics.snapshot()
    }

    /// Register a transport after construction
    pub fn add_transport(&self, transport: SharedTransport) -> Result<()> {
        if self.is_closed() {
            return Err(LoggerError::LoggerClosed);
        }
        self.shared.add_transport(transport)
    }

    /// Register a plugin; fails (and reports) when its `init` fails
    pub fn add_plugin(&self, plugin: SharedPlugin) -> Result<()> {
        if self.is_closed() {
            return Err(LoggerError::LoggerClosed);
        }
        self.shared.add_plugin(plugin)
    }

    pub fn transport_count(&self) -> usize {
        self.shared.routes.read().len()
    }

    pub fn plugin_count(&self) -> usize {
        self.shared.plugins.read().len()
    }

    pub fn level(&self) -> LogLevel {
        self.shared.level()
    }

    /// Change the level for every handle of this logger
    pub fn set_level<L: IntoLogLevel>(&self, level: L) -> Result<()> {
        let level = level.into_level()?;
        self.shared.level.store(level.rank(), Ordering::Relaxed);
        Ok(())
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.shared.config
    }

    pub fn stats(&self) -> &LoggerStats {
        &self.shared.stats
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.config.enabled
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Ask every transport to flush; in threaded mode, waits for each
    /// worker to drain what was queued before the call
    pub fn flush(&self) {
        if self.is_closed() {
            return;
        }
        self.shared.flush();
    }

    /// Flush and close every transport and destroy plugins
    ///
    /// Affects every handle of this logger. Later calls do nothing, and
    /// logging after close is a no-op.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.shutdown();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("environment", &self.shared.config.environment)
            .field("transports", &self.transport_count())
            .field("plugins", &self.plugin_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// Transports given here adopt the builder's formatter unless they were
/// constructed with one. Without any transport, a
/// [`ConsoleTransport`](crate::transports::ConsoleTransport) is used.
///
/// # Example
/// ```
/// use fanout_logger::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .environment("production")
///     .level(LogLevel::Http)
///     .rate_limit(RateLimitConfig::new(100, Duration::from_secs(1)))
///     .transport(NullTransport)
///     .plugin(FieldInjectorPlugin::new().with_field("service", "billing"))
///     .build()?;
/// # Ok::<(), fanout_logger::LoggerError>(())
/// ```
#[must_use = "builder methods return a new value"]
pub struct LoggerBuilder {
    config: LoggerConfig,
    explicit_level: Option<LogLevel>,
    transports: Vec<SharedTransport>,
    plugins: Vec<SharedPlugin>,
    formatter: Option<SharedFormatter>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            explicit_level: None,
            transports: Vec::new(),
            plugins: Vec::new(),
            formatter: None,
        }
    }

    /// Replace the whole configuration; its level counts as explicit
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.explicit_level = Some(config.level);
        self.config = config;
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.explicit_level = Some(level);
        self
    }

    /// Without an explicit level, the environment picks the default one
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.environment = environment.into();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn default_context(mut self, context: LogContext) -> Self {
        self.config.default_context = context;
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(rate_limit);
        self
    }

    pub fn performance(mut self, performance: PerformanceConfig) -> Self {
        self.config.performance = performance;
        self
    }

    pub fn sanitize(mut self, sanitize: SanitizeConfig) -> Self {
        self.config.sanitize = sanitize;
        self
    }

    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.config.dispatch = mode;
        self
    }

    /// Log panics through this logger
    pub fn handle_exceptions(mut self, handle: bool) -> Self {
        self.config.error_handling.handle_exceptions = handle;
        self
    }

    /// Exit with status 1 after a logged panic
    pub fn exit_on_error(mut self, exit: bool) -> Self {
        self.config.error_handling.exit_on_error = exit;
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transports.push(Arc::new(transport));
        self
    }

    /// Add a transport the caller keeps a handle to
    pub fn shared_transport(mut self, transport: SharedTransport) -> Self {
        self.transports.push(transport);
        self
    }

    /// Formatter adopted by transports that were not given their own
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Build the Logger
    ///
    /// Fails on an invalid configuration or when a worker thread cannot be
    /// spawned. A plugin whose `init` fails is reported and left out.
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            mut config,
            explicit_level,
            mut transports,
            plugins,
            formatter,
        } = self;

        config.level = explicit_level
            .unwrap_or_else(|| super::config::default_level_for(&config.environment));

        if transports.is_empty() {
            transports.push(Arc::new(crate::transports::ConsoleTransport::new()));
        }

        let shared = LoggerShared::new(config, formatter)?;
        for transport in transports {
            shared.add_transport(transport)?;
        }
        for plugin in plugins {
            // Already reported; the logger runs without it
            let _ = shared.add_plugin(plugin);
        }

        let logger = Logger::from_shared(Arc::new(shared));
        if logger.config().error_handling.installs_hook() {
            process_hooks::install_panic_hook(
                logger.clone(),
                logger.config().error_handling.exit_on_error,
            );
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
