use crate::{
    buffer::EventBuffer,
    config::{MatchedPolicy, MonitorConfig},
    types::{CycleReport, ListingEvent},
    window::PollWindow,
};
use std::collections::HashSet;

/// The state owned by one collection monitor: both live buffers, the
/// matched history, and the polling window tracker.
#[derive(Debug)]
pub struct ReconcilerState {
    /// Events received from the push stream, not yet matched.
    stream_buf: EventBuffer,

    /// Events retrieved from the polling API, not yet matched.
    poll_buf: EventBuffer,

    /// Lower bound of the polling query.
    window: PollWindow,

    matched_policy: MatchedPolicy,

    /// Matched events, kept under [MatchedPolicy::RetainEvents].
    matched_events: Vec<ListingEvent>,

    /// Timestamps confirmed on both sources. Consulted on poll ingest so
    /// a window that still covers an already-matched event never
    /// reintroduces it.
    matched_timestamps: HashSet<i64>,

    matched_total: usize,
}

impl ReconcilerState {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            stream_buf: EventBuffer::new(),
            poll_buf: EventBuffer::new(),
            window: PollWindow::new(config.skew, config.retention),
            matched_policy: config.matched_policy,
            matched_events: Vec::new(),
            matched_timestamps: HashSet::new(),
            matched_total: 0,
        }
    }

    pub fn window(&self) -> &PollWindow {
        &self.window
    }

    /// Current lower bound of the polling query, if initialized.
    pub fn occurred_after(&self) -> Option<i64> {
        self.window.occurred_after()
    }

    /// Ingest one event from the push stream.
    ///
    /// The first event initializes the polling window; every event is
    /// appended in arrival order. Returns true when this event
    /// initialized the window.
    pub fn ingest_stream_event(&mut self, event: ListingEvent) -> bool {
        let initialized = self.window.observe_first_event(event.event_timestamp);
        self.stream_buf.push(event);
        initialized
    }

    /// Ingest one event from the polling API.
    ///
    /// The event is dropped when its timestamp is already present in the
    /// live poll buffer or in the matched history, since each cycle
    /// re-queries from the window lower bound and may re-return events
    /// seen in a prior cycle. Returns whether the event was kept.
    pub fn ingest_poll_event(&mut self, event: ListingEvent) -> bool {
        if self.poll_buf.contains_timestamp(event.event_timestamp)
            || self.matched_timestamps.contains(&event.event_timestamp)
        {
            return false;
        }
        self.poll_buf.push(event);
        true
    }

    /// Pair buffered stream events against buffered poll events by exact
    /// timestamp equality, removing each matched pair from both buffers
    /// as a unit.
    ///
    /// Both buffers are walked from most-recently-added to oldest;
    /// removing from the tail backward never shifts the indices of
    /// not-yet-visited entries. When several poll events share a
    /// timestamp, the first encountered in the reverse scan wins.
    pub fn match_pass(&mut self) -> CycleReport {
        let mut matched_in_pass = 0;

        for stream_idx in (0..self.stream_buf.len()).rev() {
            let timestamp = self.stream_buf.get(stream_idx).unwrap().event_timestamp;

            for poll_idx in (0..self.poll_buf.len()).rev() {
                if self.poll_buf.get(poll_idx).unwrap().event_timestamp == timestamp {
                    let event = self.stream_buf.remove(stream_idx);
                    self.poll_buf.remove(poll_idx);
                    self.record_match(event);
                    matched_in_pass += 1;
                    break;
                }
            }
        }

        CycleReport {
            stream_only: self.stream_buf.len(),
            api_only: self.poll_buf.len(),
            matched_in_pass,
            matched_total: self.matched_total,
        }
    }

    fn record_match(&mut self, event: ListingEvent) {
        self.matched_total += 1;
        self.matched_timestamps.insert(event.event_timestamp);
        if self.matched_policy == MatchedPolicy::RetainEvents {
            self.matched_events.push(event);
        }
    }

    /// Advance the polling window lower bound; see [PollWindow::advance].
    pub fn advance_window(&mut self, now: i64) {
        self.window.advance(now);
    }

    /// Stream events not yet confirmed by the polling API.
    pub fn stream_events(&self) -> &[ListingEvent] {
        self.stream_buf.as_slice()
    }

    /// Polled events not yet confirmed by the push stream.
    pub fn poll_events(&self) -> &[ListingEvent] {
        self.poll_buf.as_slice()
    }

    /// Events confirmed on both sources, empty under
    /// [MatchedPolicy::CountOnly].
    pub fn matched_events(&self) -> &[ListingEvent] {
        &self.matched_events
    }

    pub fn matched_total(&self) -> usize {
        self.matched_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: i64, permalink: &str) -> ListingEvent {
        ListingEvent::new(timestamp, permalink)
    }

    fn state() -> ReconcilerState {
        ReconcilerState::new(&MonitorConfig::default())
    }

    #[test]
    fn test_match_pass_pairs_equal_timestamps() {
        // Stream: [{t:100,p:"a"}, {t:101,p:"b"}]
        // Poll:   [{t:101,p:"b"}, {t:102,p:"c"}]
        // Expected: matched {t:101}, stream residual [{t:100}],
        // poll residual [{t:102}]
        let mut state = state();
        state.ingest_stream_event(event(100, "a"));
        state.ingest_stream_event(event(101, "b"));
        assert!(state.ingest_poll_event(event(101, "b")));
        assert!(state.ingest_poll_event(event(102, "c")));

        let report = state.match_pass();

        assert_eq!(report.matched_in_pass, 1);
        assert_eq!(report.matched_total, 1);
        assert_eq!(report.stream_only, 1);
        assert_eq!(report.api_only, 1);
        assert_eq!(state.stream_events()[0].event_timestamp, 100);
        assert_eq!(state.poll_events()[0].event_timestamp, 102);
        assert_eq!(state.matched_events()[0].event_timestamp, 101);
    }

    #[test]
    fn test_match_pass_on_empty_buffers_is_noop() {
        let mut state = state();
        let report = state.match_pass();
        assert_eq!(report, CycleReport::default());
    }

    #[test]
    fn test_no_timestamp_in_both_buffers_after_pass() {
        let mut state = state();
        for ts in [10, 20, 30, 40] {
            state.ingest_stream_event(event(ts, "s"));
        }
        for ts in [20, 40, 50] {
            state.ingest_poll_event(event(ts, "p"));
        }

        state.match_pass();

        for stream_event in state.stream_events() {
            assert!(
                !state
                    .poll_events()
                    .iter()
                    .any(|p| p.event_timestamp == stream_event.event_timestamp)
            );
        }
    }

    #[test]
    fn test_duplicate_stream_timestamps_match_at_most_available_pairs() {
        // Stream redelivery can place the same timestamp twice on the
        // stream side; only one poll event exists, so exactly one pair
        // forms and the redelivered copy stays stream-only.
        let mut state = state();
        state.ingest_stream_event(event(100, "first"));
        state.ingest_stream_event(event(100, "redelivered"));
        state.ingest_poll_event(event(100, "p"));

        let report = state.match_pass();

        assert_eq!(report.matched_in_pass, 1);
        assert_eq!(report.stream_only, 1);
        assert_eq!(report.api_only, 0);
    }

    #[test]
    fn test_poll_ingest_dedups_within_buffer() {
        let mut state = state();
        assert!(state.ingest_poll_event(event(100, "a")));
        assert!(!state.ingest_poll_event(event(100, "a")));
        assert_eq!(state.poll_events().len(), 1);
    }

    #[test]
    fn test_poll_ingest_dedups_against_matched_history() {
        let mut state = state();
        state.ingest_stream_event(event(100, "a"));
        state.ingest_poll_event(event(100, "a"));
        state.match_pass();
        assert_eq!(state.matched_total(), 1);

        // The window still covers t=100, so later cycles re-return it.
        assert!(!state.ingest_poll_event(event(100, "a")));
        assert!(!state.ingest_poll_event(event(100, "a")));

        let report = state.match_pass();
        assert_eq!(report.matched_in_pass, 0);
        assert_eq!(report.matched_total, 1);
    }

    #[test]
    fn test_count_only_policy_still_prevents_rematch() {
        let config = MonitorConfig {
            matched_policy: MatchedPolicy::CountOnly,
            ..MonitorConfig::default()
        };
        let mut state = ReconcilerState::new(&config);

        state.ingest_stream_event(event(100, "a"));
        state.ingest_poll_event(event(100, "a"));
        state.match_pass();

        assert!(state.matched_events().is_empty());
        assert_eq!(state.matched_total(), 1);
        assert!(!state.ingest_poll_event(event(100, "a")));
    }

    #[test]
    fn test_first_stream_event_initializes_window() {
        let mut state = state();
        assert_eq!(state.occurred_after(), None);

        assert!(state.ingest_stream_event(event(1_000, "a")));
        assert_eq!(state.occurred_after(), Some(995));

        assert!(!state.ingest_stream_event(event(2_000, "b")));
        assert_eq!(state.occurred_after(), Some(995));
    }
}
