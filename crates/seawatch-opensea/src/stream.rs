//! OpenSea stream client (the push channel).
//!
//! Subscribes to one collection's channel over the Phoenix WebSocket
//! endpoint and forwards canonicalized `item_listed` events into a flume
//! channel. Transport errors never terminate the client: each failed
//! session is logged and followed by a delayed reconnect, and the server
//! may re-deliver events after a reconnect — the core engine's
//! deduplication absorbs that.

use crate::model::{ItemListedEnvelope, PhoenixFrame};
use eyre::{Result, WrapErr, bail};
use futures::{SinkExt, StreamExt};
use seawatch_core::ListingEvent;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

pub const OPENSEA_STREAM_URL: &str = "wss://stream.openseabeta.com/socket/websocket";

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Phoenix-channel subscription for one collection's listing events.
#[derive(Debug, Clone)]
pub struct StreamClient {
    url: Url,
    collection: String,
}

enum SessionEnd {
    ReceiverDropped,
}

impl StreamClient {
    pub fn new(api_key: &str, collection: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(OPENSEA_STREAM_URL, api_key, collection)
    }

    /// Connect to a different stream endpoint, e.g. a local stub.
    pub fn with_endpoint(
        endpoint: &str,
        api_key: &str,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let mut url = Url::parse(endpoint).wrap_err("invalid stream endpoint")?;
        url.query_pairs_mut()
            .append_pair("token", api_key)
            .append_pair("vsn", "1.0.0");
        Ok(Self {
            url,
            collection: collection.into(),
        })
    }

    fn topic(&self) -> String {
        format!("collection:{}", self.collection)
    }

    /// Run the subscription until the receiving side of `tx` is dropped.
    pub async fn run(self, tx: flume::Sender<ListingEvent>) {
        loop {
            match self.session(&tx).await {
                Ok(SessionEnd::ReceiverDropped) => {
                    info!("push receiver dropped; stream client stopping");
                    return;
                }
                Err(error) => {
                    warn!(error = %error, "stream transport error");
                }
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    async fn session(&self, tx: &flume::Sender<ListingEvent>) -> Result<SessionEnd> {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .wrap_err("failed to connect to stream endpoint")?;
        info!(collection = %self.collection, "Connected to listing stream");
        let (mut sink, mut stream) = ws.split();

        let join = PhoenixFrame::join(self.topic());
        sink.send(Message::text(serde_json::to_string(&join)?))
            .await
            .wrap_err("failed to join collection channel")?;
        debug!(topic = %self.topic(), "Joined collection channel");

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately; heartbeats start one
        // interval after the join.
        heartbeat.tick().await;
        let mut frame_ref = 1u64;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    frame_ref += 1;
                    let frame = PhoenixFrame::heartbeat(frame_ref);
                    sink.send(Message::text(serde_json::to_string(&frame)?))
                        .await
                        .wrap_err("failed to send heartbeat")?;
                }
                message = stream.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            let Some(event) = decode_item_listed(&text) else {
                                continue;
                            };
                            if tx.send(event).is_err() {
                                return Ok(SessionEnd::ReceiverDropped);
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            sink.send(Message::Pong(payload)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            bail!("stream closed by server: {frame:?}");
                        }
                        Some(Ok(_)) => {}
                        Some(Err(error)) => {
                            return Err(error).wrap_err("stream read failed");
                        }
                        None => bail!("stream ended unexpectedly"),
                    }
                }
            }
        }
    }
}

/// Decode an `item_listed` frame into a canonical event.
///
/// Replies, heartbeat acks, other event types, and undecodable payloads
/// are skipped; a skipped frame is never an error for the session.
fn decode_item_listed(text: &str) -> Option<ListingEvent> {
    let frame: PhoenixFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(error) => {
            debug!(error = %error, "Skipping undecodable frame");
            return None;
        }
    };

    if frame.event != "item_listed" {
        debug!(event = %frame.event, topic = %frame.topic, "Ignoring frame");
        return None;
    }

    let envelope: ItemListedEnvelope = match serde_json::from_value(frame.payload) {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(error = %error, "Malformed item_listed payload");
            return None;
        }
    };

    match envelope.payload.to_listing_event() {
        Ok(event) => Some(event),
        Err(error) => {
            warn!(
                error = %error,
                timestamp = %envelope.payload.event_timestamp,
                "Unparseable event timestamp"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_item_listed_frame() {
        let text = r#"{
            "topic": "collection:cool-cats",
            "event": "item_listed",
            "payload": {
                "event_type": "item_listed",
                "payload": {
                    "event_timestamp": "1970-01-01T00:01:40+00:00",
                    "item": { "permalink": "https://opensea.io/assets/1" }
                }
            }
        }"#;

        let event = decode_item_listed(text).unwrap();
        assert_eq!(event.event_timestamp, 100);
        assert_eq!(event.permalink, "https://opensea.io/assets/1");
    }

    #[test]
    fn test_decode_skips_replies_and_other_events() {
        let reply = r#"{
            "topic": "collection:cool-cats",
            "event": "phx_reply",
            "payload": { "status": "ok", "response": {} },
            "ref": "1"
        }"#;
        assert!(decode_item_listed(reply).is_none());

        let other = r#"{
            "topic": "collection:cool-cats",
            "event": "item_sold",
            "payload": {}
        }"#;
        assert!(decode_item_listed(other).is_none());
    }

    #[test]
    fn test_decode_skips_garbage() {
        assert!(decode_item_listed("not json").is_none());
        assert!(decode_item_listed(r#"{"topic":"t","event":"item_listed","payload":{}}"#).is_none());
    }

    #[test]
    fn test_endpoint_carries_token_and_protocol_version() {
        let client = StreamClient::new("test-key", "cool-cats").unwrap();
        let query = client.url.query().unwrap();
        assert!(query.contains("token=test-key"));
        assert!(query.contains("vsn=1.0.0"));
        assert_eq!(client.topic(), "collection:cool-cats");
    }
}
