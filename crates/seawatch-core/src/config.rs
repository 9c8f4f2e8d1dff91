use eyre::{Result, ensure};
use serde::Deserialize;
use std::time::Duration;

/// Policy for paginating the polling API across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorPolicy {
    /// Restart pagination from the window lower bound on every cycle.
    /// Simpler and self-correcting; re-returned events are absorbed by
    /// deduplication.
    #[default]
    RestartEachCycle,

    /// Resume from the continuation cursor the previous cycle ended on.
    /// Fewer requests per cycle; the carried cursor is invalidated
    /// whenever a cycle fails, so the next cycle restarts from the
    /// window bound.
    CarryForward,
}

/// Policy for retaining events confirmed on both sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedPolicy {
    /// Keep every matched event for diagnostics.
    #[default]
    RetainEvents,

    /// Keep only a running counter. Matched timestamps are still recorded
    /// so a previously-matched event re-returned by the polling window is
    /// never counted again.
    CountOnly,
}

/// Configuration parameters for a collection monitor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Cadence of poll cycles. The fixed interval also serves as the
    /// retry delay after a failed cycle.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Delay before each page request. The default of 250ms respects the
    /// polling API's 4 requests/second limit.
    #[serde(with = "humantime_serde")]
    pub page_delay: Duration,

    /// Subtracted from the first stream event's timestamp when the window
    /// lower bound is initialized, compensating for clock skew between
    /// the two sources.
    #[serde(with = "humantime_serde")]
    pub skew: Duration,

    /// Trailing interval the window lower bound keeps open behind the
    /// wall clock, so events that surface late on the polling API are
    /// still retrievable.
    #[serde(with = "humantime_serde")]
    pub retention: Duration,

    pub cursor_policy: CursorPolicy,

    pub matched_policy: MatchedPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            page_delay: Duration::from_millis(250),
            skew: Duration::from_secs(5),
            retention: Duration::from_secs(60),
            cursor_policy: CursorPolicy::default(),
            matched_policy: MatchedPolicy::default(),
        }
    }
}

impl MonitorConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.poll_interval.is_zero(),
            "poll_interval must be greater than zero"
        );
        ensure!(
            !self.retention.is_zero(),
            "retention must be greater than zero"
        );
        ensure!(
            self.skew < self.retention,
            "skew must be smaller than retention"
        );
        Ok(())
    }
}
