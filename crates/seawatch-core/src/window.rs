use std::time::Duration;

/// Tracks the lower bound (`occurred_after`) of the polling query window.
///
/// The bound is set exactly once, from the first stream event, and from
/// then on only moves forward. A trailing retention interval keeps the
/// window open behind the wall clock so events that surface late on the
/// polling API remain retrievable.
#[derive(Debug)]
pub struct PollWindow {
    occurred_after: Option<i64>,
    skew: Duration,
    retention: Duration,
}

impl PollWindow {
    pub fn new(skew: Duration, retention: Duration) -> Self {
        Self {
            occurred_after: None,
            skew,
            retention,
        }
    }

    /// The current lower bound in epoch seconds, if initialized.
    pub fn occurred_after(&self) -> Option<i64> {
        self.occurred_after
    }

    pub fn is_initialized(&self) -> bool {
        self.occurred_after.is_some()
    }

    /// Initialize the window from the first observed stream event.
    ///
    /// Sets `occurred_after = timestamp - skew`, compensating for clock
    /// skew between the two sources. Returns true on the initializing
    /// call; later calls are no-ops and return false.
    pub fn observe_first_event(&mut self, timestamp: i64) -> bool {
        if self.occurred_after.is_some() {
            return false;
        }
        self.occurred_after = Some(timestamp - self.skew.as_secs() as i64);
        true
    }

    /// Advance the lower bound to `max(occurred_after, now - retention)`.
    ///
    /// Never moves the bound backward, and does nothing before the window
    /// is initialized.
    pub fn advance(&mut self, now: i64) {
        let Some(current) = self.occurred_after else {
            return;
        };
        self.occurred_after = Some(current.max(now - self.retention.as_secs() as i64));
    }
}
