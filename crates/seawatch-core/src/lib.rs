//! This library reconciles "item listed" events observed for one
//! marketplace collection over two independent channels: a push stream
//! that delivers events as they occur, and a paginated polling API
//! re-queried on a fixed cadence. Each observed event is classified as
//! stream-only, api-only, or matched-on-both, and deduplication
//! guarantees that no event is counted twice across overlapping polling
//! windows.
//!
//! # Usage
//!
//! ```rust
//! use async_trait::async_trait;
//! use seawatch_core::{
//!     EventPage, ListingEvent, Monitor, MonitorConfig, PageQuery, PageSource,
//! };
//! use std::{sync::Mutex, time::Duration};
//!
//! // A polling source serving one canned page.
//! struct SinglePage(Mutex<Option<EventPage>>);
//!
//! #[async_trait]
//! impl PageSource for SinglePage {
//!     async fn fetch_page(&self, _query: &PageQuery) -> eyre::Result<EventPage> {
//!         Ok(self.0.lock().unwrap().take().unwrap_or_default())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> eyre::Result<()> {
//! // The stream client fills this channel; here it is preloaded and the
//! // sender dropped so the monitor stops after its final pass.
//! let (tx, rx) = flume::unbounded();
//! tx.send(ListingEvent::new(1_700_000_100, "https://example.test/item/1"))
//!     .unwrap();
//! tx.send(ListingEvent::new(1_700_000_101, "https://example.test/item/2"))
//!     .unwrap();
//! drop(tx);
//!
//! let source = SinglePage(Mutex::new(Some(EventPage {
//!     events: vec![ListingEvent::new(1_700_000_101, "https://example.test/item/2")],
//!     next: None,
//! })));
//!
//! let config = MonitorConfig {
//!     poll_interval: Duration::from_millis(10),
//!     page_delay: Duration::from_millis(1),
//!     ..MonitorConfig::default()
//! };
//! let report = Monitor::new(rx, source, config)?.run().await;
//!
//! assert_eq!(report.matched_total, 1);
//! assert_eq!(report.stream_only, 1);
//! assert_eq!(report.api_only, 0);
//! # Ok(())
//! # }
//! ```

pub mod buffer;
mod config;
mod monitor;
mod poll;
pub mod state;
mod types;
mod window;

pub use config::{CursorPolicy, MatchedPolicy, MonitorConfig};
pub use monitor::Monitor;
pub use poll::{CycleOutcome, PollDriver};
pub use state::ReconcilerState;
pub use types::*;
pub use window::PollWindow;
