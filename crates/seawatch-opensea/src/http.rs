//! OpenSea events API client (the polling channel).

use crate::model::EventsResponse;
use async_trait::async_trait;
use reqwest::Client;
use seawatch_core::{EventPage, ListingEvent, PageQuery, PageSource};
use tracing::{debug, error};
use url::Url;

pub const OPENSEA_API_BASE: &str = "https://api.opensea.io/api/v1/";

/// Client for `GET /api/v1/events`, querying "created" (item listed)
/// events for one collection.
///
/// Implements [`PageSource`]; the poll-cycle driver owns pagination and
/// rate limiting, this client issues single page requests.
#[derive(Debug, Clone)]
pub struct EventsClient {
    client: Client,
    api_key: String,
    base_url: Url,
    collection: String,
}

impl EventsClient {
    pub fn new(
        api_key: impl Into<String>,
        collection: impl Into<String>,
    ) -> Result<Self, OpenseaHttpError> {
        Self::with_base_url(api_key, collection, OPENSEA_API_BASE)
    }

    /// Point the client at a different API root, e.g. a local stub.
    pub fn with_base_url(
        api_key: impl Into<String>,
        collection: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, OpenseaHttpError> {
        let base_url = Url::parse(base_url).map_err(|e| OpenseaHttpError::Url(e.to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url,
            collection: collection.into(),
        })
    }

    fn events_url(&self, query: &PageQuery) -> Result<Url, OpenseaHttpError> {
        let mut url = self
            .base_url
            .join("events")
            .map_err(|e| OpenseaHttpError::Url(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("collection_slug", &self.collection)
            .append_pair("event_type", "created")
            .append_pair("occurred_after", &query.occurred_after.to_string());
        if let Some(cursor) = &query.cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }
        Ok(url)
    }

    async fn fetch_events(&self, query: &PageQuery) -> Result<EventPage, OpenseaHttpError> {
        let url = self.events_url(query)?;
        debug!(url = %url, "Fetching events page");

        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| OpenseaHttpError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "OpenSea events request failed");
            return Err(OpenseaHttpError::Api(format!("Status {}: {}", status, body)));
        }

        let response: EventsResponse = resp
            .json()
            .await
            .map_err(|e| OpenseaHttpError::Decode(e.to_string()))?;

        Ok(EventPage {
            events: response
                .asset_events
                .into_iter()
                .map(ListingEvent::from)
                .collect(),
            // Some API versions signal the last page with an empty string
            // rather than null.
            next: response.next.filter(|cursor| !cursor.is_empty()),
        })
    }
}

#[async_trait]
impl PageSource for EventsClient {
    async fn fetch_page(&self, query: &PageQuery) -> eyre::Result<EventPage> {
        Ok(self.fetch_events(query).await?)
    }
}

/// Errors from OpenSea HTTP operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpenseaHttpError {
    #[error("URL error: {0}")]
    Url(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> EventsClient {
        EventsClient::new("test-key", "cool-cats").unwrap()
    }

    #[test]
    fn test_events_url_without_cursor() {
        let url = client()
            .events_url(&PageQuery {
                occurred_after: 1_700_000_000,
                cursor: None,
            })
            .unwrap();

        assert_eq!(url.path(), "/api/v1/events");
        let query = url.query().unwrap();
        assert!(query.contains("collection_slug=cool-cats"));
        assert!(query.contains("event_type=created"));
        assert!(query.contains("occurred_after=1700000000"));
        assert!(!query.contains("cursor"));
    }

    #[test]
    fn test_events_url_with_cursor() {
        let url = client()
            .events_url(&PageQuery {
                occurred_after: 1_700_000_000,
                cursor: Some("cD0yMDIy".to_string()),
            })
            .unwrap();

        assert!(url.query().unwrap().contains("cursor=cD0yMDIy"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = EventsClient::with_base_url("k", "c", "not a url");
        assert!(matches!(result, Err(OpenseaHttpError::Url(_))));
    }
}
