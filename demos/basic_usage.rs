//! Basic logger usage example
//!
//! Demonstrates levels, context, child loggers, timers and the macros with a
//! console transport.
//!
//! Run with: cargo run --example basic_usage

use fanout_logger::prelude::*;
use fanout_logger::{info, warn};
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Fanout Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .level(LogLevel::Silly)
        .transport(ConsoleTransport::new())
        .build()?;

    println!("1. Logging at different levels:");
    logger.error("This is an error message");
    logger.warn("This is a warning message");
    logger.info("This is an info message");
    logger.http("GET /health 200");
    logger.verbose("This is a verbose message");
    logger.debug("This is a debug message");
    logger.silly("This is a silly message");
    logger.flush();

    println!("\n2. Minimum level set to INFO - verbose and below won't show:");
    logger.set_level(LogLevel::Info)?;
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");
    logger.flush();

    println!("\n3. Structured data and context:");
    let api = logger.child(LogContext::new().with_component("api"));
    api.info_with(
        "request handled",
        Some(LogData::map([("status", 200), ("bytes", 5120)])),
        Some(LogContext::new().with_request_id("req-7f3a")),
    );
    api.warn_with(
        "login attempt",
        Some(LogData::map([("user", "alice"), ("password", "hunter2")])),
        None,
    );
    {
        let _guard = api.push_context(LogContext::new().with_user_id("u-42"));
        info!(api, "user {} opened settings", 42);
    }
    logger.flush();

    println!("\n4. Timers:");
    logger.time("startup");
    std::thread::sleep(Duration::from_millis(20));
    logger.time_end("startup");
    logger.time_end("never-started");
    logger.flush();

    warn!(logger, "shutting down after {} checks", 3);
    logger.close();

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
