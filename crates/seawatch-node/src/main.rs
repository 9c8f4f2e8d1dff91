//! seawatch node entry point.
//!
//! Monitors one marketplace collection over both OpenSea channels and
//! logs per-cycle reconciliation reports until terminated.

use eyre::{Result, bail};
use seawatch_core::{Monitor, MonitorConfig};
use seawatch_opensea::{EventsClient, StreamClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Both startup inputs are required before any subsystem starts.
    let Ok(api_key) = std::env::var("OS_API_KEY") else {
        bail!(
            "Environment variable 'OS_API_KEY' is required.\n\
             Usage: OS_API_KEY=<api-key> seawatch <collection-slug>"
        );
    };
    let Some(collection) = std::env::args().nth(1) else {
        bail!("Usage: seawatch <collection-slug>");
    };

    let config = MonitorConfig::default();
    info!(
        collection = %collection,
        poll_interval = ?config.poll_interval,
        retention = ?config.retention,
        "Starting collection monitor"
    );

    let stream = StreamClient::new(&api_key, collection.clone())?;
    let events = EventsClient::new(&api_key, collection)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        // The sender side lives in the stream task for the process
        // lifetime, so the monitor runs until externally terminated.
        let (tx, rx) = flume::unbounded();
        tokio::spawn(stream.run(tx));

        let monitor = Monitor::new(rx, events, config)?;
        let report = monitor.run().await;
        info!(
            matched_total = report.matched_total,
            stream_only = report.stream_only,
            api_only = report.api_only,
            "Monitor stopped"
        );
        Ok(())
    })
}
