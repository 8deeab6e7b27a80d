//! Process-wide default logger
//!
//! Explicit [`Logger`] instances work without ever touching this module.
//!
//! ```
//! use fanout_logger::{global, info};
//!
//! info!(global::logger(), "service starting on port {}", 8080);
//! ```

use super::config::LoggerConfig;
use super::error::{report_internal, LoggerError, Result};
use super::logger::{Logger, LoggerBuilder};
use parking_lot::RwLock;

static DEFAULT: RwLock<Option<Logger>> = parking_lot::const_rwlock(None);

/// Build and install the default logger
///
/// Fails if a default is already installed; call [`shutdown`] first to
/// replace it.
pub fn init(builder: LoggerBuilder) -> Result<Logger> {
    let mut slot = DEFAULT.write();
    if slot.is_some() {
        return Err(LoggerError::config(
            "global",
            "default logger is already initialized",
        ));
    }
    let logger = builder.build()?;
    *slot = Some(logger.clone());
    Ok(logger)
}

/// The default logger, created from the environment on first use
///
/// A broken environment (for example an unknown `LOG_LEVEL`) is reported and
/// yields a disabled logger rather than failing the caller.
pub fn logger() -> Logger {
    if let Some(ref logger) = *DEFAULT.read() {
        return logger.clone();
    }

    let mut slot = DEFAULT.write();
    if let Some(ref logger) = *slot {
        return logger.clone();
    }

    let logger = match LoggerConfig::from_env().and_then(|c| Logger::builder().config(c).build()) {
        Ok(logger) => logger,
        Err(e) => {
            report_internal("global", &e);
            Logger::disabled()
        }
    };
    *slot = Some(logger.clone());
    logger
}

pub fn is_initialized() -> bool {
    DEFAULT.read().is_some()
}

/// Close and remove the default logger; later calls to [`logger`] create a
/// fresh one
pub fn shutdown() {
    let logger = DEFAULT.write().take();
    if let Some(logger) = logger {
        logger.close();
    }
}
