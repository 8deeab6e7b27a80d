//! Batched HTTP delivery example
//!
//! Ships JSON entries to a collector in batches while mirroring them to the
//! console. Point `LOG_COLLECTOR_URL` at a real endpoint; otherwise the
//! failures are reported on stderr and the batch stays queued for retry.
//!
//! Run with: cargo run --example batched_http

use fanout_logger::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    let endpoint = std::env::var("LOG_COLLECTOR_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:9/ingest".to_string());
    println!("=== Fanout Logger - Batched HTTP Example ({}) ===\n", endpoint);

    let sender = HttpSender::builder(endpoint)
        .timeout(Duration::from_secs(2))
        .header("X-Service", "batched-http-demo")
        .build()?;

    let http = HttpTransport::with_config(
        sender,
        BatchQueueConfig {
            batch_size: 10,
            flush_interval: Duration::from_secs(1),
            ..Default::default()
        },
    )?;

    let logger = Logger::builder()
        .environment("production")
        .transport(ConsoleTransport::new())
        .transport(http)
        .build()?;

    for i in 0..25 {
        logger.info_with(
            "order processed",
            Some(LogData::map([("order", i)])),
            Some(LogContext::new().with_component("orders")),
        );
    }

    std::thread::sleep(Duration::from_millis(1500));
    logger.close();

    println!("\n=== Example completed ===");
    Ok(())
}
