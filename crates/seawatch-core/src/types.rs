use async_trait::async_trait;
use eyre::Result;

/// A single "item listed" observation, canonicalized from either channel.
///
/// Timestamps are epoch seconds at second resolution. The timestamp alone
/// is the uniqueness key for matching and deduplication; the permalink is
/// informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEvent {
    pub event_timestamp: i64,
    pub permalink: String,
}

impl ListingEvent {
    pub fn new(event_timestamp: i64, permalink: impl Into<String>) -> Self {
        Self {
            event_timestamp,
            permalink: permalink.into(),
        }
    }
}

/// Query parameters for one page of the polling API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Lower bound on event timestamps, epoch seconds.
    pub occurred_after: i64,
    /// Continuation cursor from the previous page, if any.
    pub cursor: Option<String>,
}

/// One page of events returned by the polling API.
///
/// `next` is the continuation cursor; `None` signals the last page.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<ListingEvent>,
    pub next: Option<String>,
}

/// A paginated retrieval source consumed by the poll-cycle driver.
///
/// Implementations fetch one page per call and report transport or decode
/// failures as errors; the driver aborts the current cycle on the first
/// failed page and retries on the next cycle.
#[async_trait]
pub trait PageSource {
    async fn fetch_page(&self, query: &PageQuery) -> Result<EventPage>;
}

/// Residual and matched counts produced by one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Events observed on the push stream but not (yet) on the polling API.
    pub stream_only: usize,
    /// Events observed on the polling API but not (yet) on the push stream.
    pub api_only: usize,
    /// Pairs matched during this cycle's pass.
    pub matched_in_pass: usize,
    /// Pairs matched since the monitor started.
    pub matched_total: usize,
}
