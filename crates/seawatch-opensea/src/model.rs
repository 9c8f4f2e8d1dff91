//! Wire types for the two OpenSea channels.

use chrono::DateTime;
use seawatch_core::ListingEvent;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events API (polling channel)
// ---------------------------------------------------------------------------

/// Response body of `GET /api/v1/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    pub asset_events: Vec<AssetEvent>,
    /// Continuation cursor; null or empty on the last page.
    pub next: Option<String>,
}

/// One event row from the events API. Timestamps are epoch seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetEvent {
    pub event_timestamp: i64,
    pub asset: Asset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub permalink: String,
}

impl From<AssetEvent> for ListingEvent {
    fn from(event: AssetEvent) -> Self {
        ListingEvent::new(event.event_timestamp, event.asset.permalink)
    }
}

// ---------------------------------------------------------------------------
// Stream (push channel, Phoenix channels over WebSocket)
// ---------------------------------------------------------------------------

/// A Phoenix frame under the vsn=1.0.0 object serializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoenixFrame {
    pub topic: String,
    pub event: String,
    pub payload: serde_json::Value,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub frame_ref: Option<String>,
}

impl PhoenixFrame {
    /// Join the channel for one collection.
    pub fn join(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            event: "phx_join".to_string(),
            payload: serde_json::json!({}),
            frame_ref: Some("1".to_string()),
        }
    }

    /// Keepalive frame the server expects on a fixed cadence.
    pub fn heartbeat(reference: u64) -> Self {
        Self {
            topic: "phoenix".to_string(),
            event: "heartbeat".to_string(),
            payload: serde_json::json!({}),
            frame_ref: Some(reference.to_string()),
        }
    }
}

/// Payload of an `item_listed` frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemListedEnvelope {
    pub event_type: String,
    pub payload: ItemListedPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemListedPayload {
    /// ISO-8601 with timezone offset.
    pub event_timestamp: String,
    pub item: ListedItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListedItem {
    pub permalink: String,
}

impl ItemListedPayload {
    /// Canonicalize to the core event type: the ISO-8601 timestamp is
    /// truncated to epoch seconds, the resolution both channels share.
    pub fn to_listing_event(&self) -> Result<ListingEvent, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.event_timestamp)?.timestamp();
        Ok(ListingEvent::new(timestamp, self.item.permalink.clone()))
    }
}
