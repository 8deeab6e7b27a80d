//! Core logger types and traits

pub mod batch_queue;
pub mod config;
pub mod error;
pub mod formatter;
pub mod global;
pub mod log_context;
pub mod log_data;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod plugin;
pub mod process_hooks;
pub mod rate_limiter;
pub mod stats;
pub mod timestamp;
pub mod transport;

pub use batch_queue::{
    AsyncBatchQueue, BatchProcessor, BatchQueueConfig, ErrorCallback, ExhaustedPolicy,
};
pub use config::{
    DispatchMode, ErrorHandlingConfig, LoggerConfig, PerformanceConfig, SanitizeConfig,
};
pub use error::{LoggerError, Result};
pub use formatter::{
    ConsoleFormatter, Formatter, JsonFormatter, LogfmtFormatter, SharedFormatter,
    SimpleFormatter,
};
pub use log_context::{ContextGuard, ContextStack, LogContext, Timing};
pub use log_data::{ErrorInfo, LogData, Sanitizer};
pub use log_entry::{LogEntry, LogEntryBuilder, Source};
pub use log_level::{IntoLogLevel, LogLevel};
pub use logger::{Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::{MetricKind, MetricSample, MetricsBuffer};
pub use plugin::{FieldInjectorPlugin, LevelOverridePlugin, Plugin, SharedPlugin};
pub use rate_limiter::{
    Clock, ManualClock, RateLimitConfig, RateLimitScope, RateLimiter, SystemClock,
};
pub use stats::LoggerStats;
pub use timestamp::TimestampFormat;
pub use transport::{FormatterSlot, SharedTransport, Transport};
