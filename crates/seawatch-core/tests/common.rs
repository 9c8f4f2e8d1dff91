use async_trait::async_trait;
use eyre::{Result, bail};
use seawatch_core::{EventPage, ListingEvent, MonitorConfig, PageQuery, PageSource};
use std::{collections::VecDeque, sync::Mutex, time::Duration};

pub fn event(timestamp: i64) -> ListingEvent {
    ListingEvent::new(timestamp, format!("https://example.test/item/{timestamp}"))
}

#[allow(dead_code)]
pub fn events(timestamps: &[i64]) -> Vec<ListingEvent> {
    timestamps.iter().map(|&ts| event(ts)).collect()
}

/// Build one page of poll results with an optional continuation cursor.
pub fn page(timestamps: &[i64], next: Option<&str>) -> Result<EventPage, String> {
    Ok(EventPage {
        events: timestamps.iter().map(|&ts| event(ts)).collect(),
        next: next.map(str::to_string),
    })
}

/// Script a failed page fetch.
#[allow(dead_code)]
pub fn failure(message: &str) -> Result<EventPage, String> {
    Err(message.to_string())
}

/// A polling source that serves a scripted sequence of page results and
/// records every query it receives. Once the script is exhausted it
/// serves empty final pages. Clones share the script and the recorded
/// queries, so a test can keep a handle after moving the source into a
/// monitor.
#[derive(Clone)]
pub struct ScriptedPages {
    inner: std::sync::Arc<ScriptedInner>,
}

struct ScriptedInner {
    script: Mutex<VecDeque<Result<EventPage, String>>>,
    queries: Mutex<Vec<PageQuery>>,
}

impl ScriptedPages {
    pub fn new(script: impl IntoIterator<Item = Result<EventPage, String>>) -> Self {
        Self {
            inner: std::sync::Arc::new(ScriptedInner {
                script: Mutex::new(script.into_iter().collect()),
                queries: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn queries(&self) -> Vec<PageQuery> {
        self.inner.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedPages {
    async fn fetch_page(&self, query: &PageQuery) -> Result<EventPage> {
        self.inner.queries.lock().unwrap().push(query.clone());
        match self.inner.script.lock().unwrap().pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => bail!(message),
            None => Ok(EventPage::default()),
        }
    }
}

/// A config with intervals short enough for tests.
pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval: Duration::from_millis(10),
        page_delay: Duration::from_millis(1),
        ..MonitorConfig::default()
    }
}
