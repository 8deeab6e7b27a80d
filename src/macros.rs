//! Logging macros for ergonomic log message formatting.
//!
//! These macros work like `format!` and record the call site (file, line and
//! module path) on the entry.
//!
//! # Examples
//!
//! ```
//! use fanout_logger::prelude::*;
//! use fanout_logger::info;
//!
//! let logger = Logger::builder().transport(NullTransport).build()?;
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! # Ok::<(), fanout_logger::LoggerError>(())
//! ```

/// Log a formatted message at any level.
///
/// The level may be a [`LogLevel`](crate::LogLevel), a level name or a
/// numeric rank, so unlike the per-level macros this evaluates to a
/// `Result<()>`.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().transport(NullTransport).build()?;
/// use fanout_logger::log;
/// log!(logger, LogLevel::Info, "Simple message")?;
/// log!(logger, "http", "GET /users -> {}", 200)?;
/// assert!(log!(logger, "loud", "nope").is_err());
/// # Ok::<(), fanout_logger::LoggerError>(())
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at(
            $level,
            format!($($arg)+),
            None,
            None,
            $crate::Source::new(file!(), line!(), Some(module_path!())),
        )
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().transport(NullTransport).build()?;
/// use fanout_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// # Ok::<(), fanout_logger::LoggerError>(())
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {{
        let _ = $crate::log!($logger, $crate::LogLevel::Error, $($arg)+);
    }};
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {{
        let _ = $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+);
    }};
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().transport(NullTransport).build()?;
/// use fanout_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// # Ok::<(), fanout_logger::LoggerError>(())
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {{
        let _ = $crate::log!($logger, $crate::LogLevel::Info, $($arg)+);
    }};
}

/// Log an HTTP-level message (request/response traffic).
#[macro_export]
macro_rules! http {
    ($logger:expr, $($arg:tt)+) => {{
        let _ = $crate::log!($logger, $crate::LogLevel::Http, $($arg)+);
    }};
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {{
        let _ = $crate::log!($logger, $crate::LogLevel::Verbose, $($arg)+);
    }};
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::builder().transport(NullTransport).build()?;
/// use fanout_logger::debug;
/// debug!(logger, "Cache miss for key {}", "user:42");
/// # Ok::<(), fanout_logger::LoggerError>(())
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {{
        let _ = $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+);
    }};
}

#[macro_export]
macro_rules! silly {
    ($logger:expr, $($arg:tt)+) => {{
        let _ = $crate::log!($logger, $crate::LogLevel::Silly, $($arg)+);
    }};
}
