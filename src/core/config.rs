//! Logger configuration
//!
//! Plain, deserializable settings. Transports, the logger-level formatter
//! and plugins are trait objects and are attached through
//! [`LoggerBuilder`](super::LoggerBuilder) instead.

use super::error::{LoggerError, Result};
use super::log_context::LogContext;
use super::log_data::{Sanitizer, DEFAULT_REDACT_KEYS};
use super::log_level::LogLevel;
use super::rate_limiter::RateLimitConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Level used when none is configured: INFO in production, DEBUG elsewhere
pub fn default_level_for(environment: &str) -> LogLevel {
    if environment.eq_ignore_ascii_case("production") {
        LogLevel::Info
    } else {
        LogLevel::Debug
    }
}

/// How entries reach the transports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// One worker thread per transport; callers only enqueue
    #[default]
    Threaded,
    /// Callers write to every transport before returning
    Inline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Record timers and metric samples
    pub enabled: bool,
    /// Fraction of metric samples kept, in `[0, 1]`
    pub sample_rate: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorHandlingConfig {
    /// Log panics through the logger
    pub handle_exceptions: bool,
    /// Same hook as `handle_exceptions`; panics on worker threads are the
    /// only asynchronous failures a Rust process surfaces
    pub handle_rejections: bool,
    /// Exit with status 1 after logging a panic
    pub exit_on_error: bool,
}

impl ErrorHandlingConfig {
    pub fn installs_hook(&self) -> bool {
        self.handle_exceptions || self.handle_rejections
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    pub max_depth: usize,
    pub redact_keys: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            redact_keys: DEFAULT_REDACT_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl SanitizeConfig {
    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.max_depth).with_redact_keys(self.redact_keys.iter().cloned())
    }
}

/// Logger settings
///
/// # Example
///
/// ```
/// use fanout_logger::{LogLevel, LoggerConfig};
///
/// let config = LoggerConfig::from_json(r#"{ "environment": "production" }"#)?;
/// assert_eq!(config.level, LogLevel::Info);
/// # Ok::<(), fanout_logger::LoggerError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub environment: String,
    /// A disabled logger accepts calls and does nothing
    pub enabled: bool,
    pub default_context: LogContext,
    pub performance: PerformanceConfig,
    pub rate_limit: Option<RateLimitConfig>,
    pub error_handling: ErrorHandlingConfig,
    pub sanitize: SanitizeConfig,
    pub dispatch: DispatchMode,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::for_environment(DEFAULT_ENVIRONMENT)
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for `environment`
    pub fn for_environment(environment: impl Into<String>) -> Self {
        let environment = environment.into();
        Self {
            level: default_level_for(&environment),
            environment,
            enabled: true,
            default_context: LogContext::default(),
            performance: PerformanceConfig::default(),
            rate_limit: None,
            error_handling: ErrorHandlingConfig::default(),
            sanitize: SanitizeConfig::default(),
            dispatch: DispatchMode::default(),
        }
    }

    /// Parse JSON settings; missing fields take their defaults, and a missing
    /// `level` follows the configured environment
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let has_level = value.get("level").is_some();

        let mut config: LoggerConfig = serde_json::from_value(value)?;
        if !has_level {
            config.level = default_level_for(&config.environment);
        }
        config.validate()?;
        Ok(config)
    }

    /// Read `LOG_LEVEL`, `LOG_ENVIRONMENT` (or `APP_ENV`) and `LOG_ENABLED`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("LOG_ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .filter(|env| !env.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let mut config = Self::for_environment(environment);

        if let Some(level) = lookup("LOG_LEVEL") {
            config.level = level
                .parse()
                .map_err(|_| LoggerError::config("LOG_LEVEL", format!("unknown level '{}'", level)))?;
        }

        if let Some(enabled) = lookup("LOG_ENABLED") {
            config.enabled = match enabled.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(LoggerError::config(
                        "LOG_ENABLED",
                        format!("expected a boolean, got '{}'", other),
                    ))
                }
            };
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.performance.sample_rate) {
            return Err(LoggerError::config(
                "performance",
                format!(
                    "sample_rate must be within [0, 1], got {}",
                    self.performance.sample_rate
                ),
            ));
        }
        if let Some(ref rate_limit) = self.rate_limit {
            rate_limit.validate()?;
        }
        if self.sanitize.max_depth == 0 {
            return Err(LoggerError::config("sanitize", "max_depth must be positive"));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
