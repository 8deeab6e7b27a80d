//! # Fanout Logger
//!
//! A structured logging pipeline. Each log call is gated by level, optionally
//! rate limited, enriched with layered context, passed through plugins and
//! fanned out concurrently to every configured transport.
//!
//! ## Features
//!
//! - **Structured entries**: context (request, user, session, component,
//!   timing), arbitrary data payloads, errors and call sites
//! - **Many transports**: console, file, any `Write` stream, in-memory,
//!   batched HTTP, closures, and fan-out groups
//! - **Isolation**: a failing or panicking transport never affects the
//!   caller or the other transports
//! - **Safe by default**: sensitive keys are redacted and deep payloads are
//!   truncated before they leave the process
//!
//! ## Example
//!
//! ```
//! use fanout_logger::prelude::*;
//!
//! let logger = Logger::builder()
//!     .environment("production")
//!     .transport(ConsoleTransport::new())
//!     .build()?;
//!
//! let api = logger.child(LogContext::new().with_component("api"));
//! api.info_with(
//!     "request handled",
//!     Some(LogData::map([("status", 200)])),
//!     Some(LogContext::new().with_request_id("req-1")),
//! );
//!
//! logger.close();
//! # Ok::<(), fanout_logger::LoggerError>(())
//! ```

pub mod core;
pub mod macros;
pub mod transports;

pub use crate::core::global;

pub mod prelude {
    pub use crate::core::{
        AsyncBatchQueue, BatchQueueConfig, ConsoleFormatter, ContextGuard, DispatchMode,
        ErrorInfo, FieldInjectorPlugin, Formatter, JsonFormatter, LevelOverridePlugin,
        LogContext, LogData, LogEntry, LogLevel, LogfmtFormatter, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerStats, Plugin, RateLimitConfig, Result,
        SimpleFormatter, Timing, TimestampFormat, Transport, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::transports::{
        BatchSender, BatchTransport, CallbackTransport, ConsoleTransport, FileTransport,
        MemoryTransport, MultiTransport, NullTransport, StreamTransport,
    };
    #[cfg(feature = "http")]
    pub use crate::transports::{HttpSender, HttpTransport};
}

pub use crate::core::{
    AsyncBatchQueue, BatchProcessor, BatchQueueConfig, ConsoleFormatter, ContextGuard,
    DispatchMode, ErrorInfo, ExhaustedPolicy, FieldInjectorPlugin, Formatter, FormatterSlot,
    IntoLogLevel, JsonFormatter, LevelOverridePlugin, LogContext, LogData, LogEntry, LogLevel,
    LogfmtFormatter, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerStats,
    MetricKind, MetricSample, Plugin, RateLimitConfig, RateLimitScope, RateLimiter, Result,
    SharedFormatter, SharedPlugin, SharedTransport, SimpleFormatter, Source, TimestampFormat,
    Timing, Transport, DEFAULT_SHUTDOWN_TIMEOUT,
};
