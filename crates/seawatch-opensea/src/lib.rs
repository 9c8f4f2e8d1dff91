//! OpenSea collaborator clients for the seawatch monitor.
//!
//! Two independent channels observe "item listed" events for a
//! collection:
//!
//! - [`StreamClient`] subscribes to the OpenSea stream (Phoenix channels
//!   over WebSocket) and forwards canonicalized events into a flume
//!   channel consumed by the monitor's reconciliation task.
//! - [`EventsClient`] queries the paginated events API and implements
//!   the core [`PageSource`](seawatch_core::PageSource) trait consumed
//!   by the poll-cycle driver.
//!
//! Both channels deliver at least once; the core engine deduplicates.

pub mod http;
pub mod model;
pub mod stream;

pub use http::{EventsClient, OPENSEA_API_BASE, OpenseaHttpError};
pub use stream::{OPENSEA_STREAM_URL, StreamClient};
