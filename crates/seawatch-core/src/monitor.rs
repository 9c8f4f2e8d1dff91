use crate::{
    config::MonitorConfig,
    poll::PollDriver,
    state::ReconcilerState,
    types::{CycleReport, ListingEvent, PageSource},
};
use chrono::Utc;
use eyre::Result;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// A single-task monitor for one collection.
///
/// Push events arrive through a flume channel filled by the stream client
/// and are drained into the stream buffer before and after every poll
/// cycle, so an event appended mid-cycle is still included in that
/// cycle's matching pass. Poll cycles, the matching pass, and window
/// advancement all run on this task; no locks are involved.
pub struct Monitor<P> {
    state: ReconcilerState,
    driver: PollDriver,
    source: P,
    push_rx: flume::Receiver<ListingEvent>,
    config: MonitorConfig,
    push_closed: bool,
}

impl<P> Monitor<P>
where
    P: PageSource,
{
    pub fn new(
        push_rx: flume::Receiver<ListingEvent>,
        source: P,
        config: MonitorConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: ReconcilerState::new(&config),
            driver: PollDriver::new(&config),
            source,
            push_rx,
            config,
            push_closed: false,
        })
    }

    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    /// Run reconciliation cycles on the configured cadence until the push
    /// channel disconnects, then return the final cycle's report.
    pub async fn run(mut self) -> CycleReport {
        let mut ticker = time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.cycle().await;
            if self.push_closed {
                break report;
            }
        }
    }

    /// Run one reconciliation cycle: drain push events, refill the poll
    /// buffer, drain again, match, advance the window, and report.
    pub async fn cycle(&mut self) -> CycleReport {
        self.drain_push();

        if self.state.window().is_initialized() {
            let outcome = self.driver.run_cycle(&self.source, &mut self.state).await;
            debug!(
                pages = outcome.pages,
                appended = outcome.appended,
                completed = outcome.completed,
                "poll cycle finished"
            );
        } else {
            debug!("waiting for first stream event before polling");
        }

        self.drain_push();
        let report = self.state.match_pass();
        self.state.advance_window(Utc::now().timestamp());
        self.log_report(&report);
        report
    }

    fn drain_push(&mut self) {
        loop {
            match self.push_rx.try_recv() {
                Ok(event) => {
                    if self.state.ingest_stream_event(event) {
                        debug!(
                            occurred_after = self.state.occurred_after(),
                            "poll window initialized from first stream event"
                        );
                    }
                }
                Err(flume::TryRecvError::Empty) => break,
                Err(flume::TryRecvError::Disconnected) => {
                    self.push_closed = true;
                    break;
                }
            }
        }
    }

    fn log_report(&self, report: &CycleReport) {
        info!(
            stream_only = report.stream_only,
            api_only = report.api_only,
            matched = report.matched_in_pass,
            matched_total = report.matched_total,
            "reconciliation cycle complete"
        );

        for event in self.state.stream_events() {
            debug!(
                timestamp = event.event_timestamp,
                permalink = %event.permalink,
                "stream event missing from api"
            );
        }
        for event in self.state.poll_events() {
            debug!(
                timestamp = event.event_timestamp,
                permalink = %event.permalink,
                "api event missing from stream"
            );
        }
    }
}
