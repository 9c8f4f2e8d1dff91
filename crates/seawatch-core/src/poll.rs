use crate::{
    config::{CursorPolicy, MonitorConfig},
    state::ReconcilerState,
    types::{PageQuery, PageSource},
};
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleOutcome {
    /// Pages fetched successfully this cycle.
    pub pages: usize,
    /// Events that survived deduplication and entered the poll buffer.
    pub appended: usize,
    /// Whether pagination ran to exhaustion. False when a page fetch
    /// failed; events from completed pages are kept either way.
    pub completed: bool,
}

/// Performs one full paginated retrieval per cycle, bounded below by the
/// window tracker and rate-limited per page.
#[derive(Debug)]
pub struct PollDriver {
    page_delay: Duration,
    cursor_policy: CursorPolicy,
    /// Continuation cursor carried between cycles under
    /// [CursorPolicy::CarryForward].
    carried_cursor: Option<String>,
}

impl PollDriver {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            page_delay: config.page_delay,
            cursor_policy: config.cursor_policy,
            carried_cursor: None,
        }
    }

    /// Run one poll cycle against `source`, appending deduplicated events
    /// to the poll buffer in `state`.
    ///
    /// Requires an initialized window; the cycle is skipped otherwise.
    /// A transport or decode failure aborts the cycle immediately: events
    /// already appended from completed pages are kept, the error is
    /// logged, and the next cycle retries from the current window bound.
    pub async fn run_cycle<P>(&mut self, source: &P, state: &mut ReconcilerState) -> CycleOutcome
    where
        P: PageSource,
    {
        let Some(occurred_after) = state.occurred_after() else {
            debug!("poll window not initialized; skipping cycle");
            return CycleOutcome::default();
        };

        let mut cursor = match self.cursor_policy {
            CursorPolicy::RestartEachCycle => None,
            CursorPolicy::CarryForward => self.carried_cursor.take(),
        };
        let mut outcome = CycleOutcome::default();

        loop {
            tokio::time::sleep(self.page_delay).await;

            let query = PageQuery {
                occurred_after,
                cursor: cursor.clone(),
            };
            let page = match source.fetch_page(&query).await {
                Ok(page) => page,
                Err(error) => {
                    warn!(
                        error = %error,
                        pages = outcome.pages,
                        "poll cycle aborted; keeping events from completed pages"
                    );
                    return outcome;
                }
            };

            outcome.pages += 1;
            for event in page.events {
                if state.ingest_poll_event(event) {
                    outcome.appended += 1;
                }
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        if self.cursor_policy == CursorPolicy::CarryForward {
            // Resume the next cycle from the final page's position; the
            // re-fetched tail page is absorbed by deduplication.
            self.carried_cursor = cursor;
        }
        outcome.completed = true;
        outcome
    }
}
