use crate::types::ListingEvent;

/// An insertion-ordered sequence of listing events awaiting reconciliation.
///
/// Sources deliver events unordered and at-least-once, so the buffer keeps
/// arrival order rather than timestamp order. The matching pass removes
/// entries at arbitrary positions, newest first.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<ListingEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append an event in arrival order.
    pub fn push(&mut self, event: ListingEvent) {
        self.events.push(event);
    }

    /// Whether any buffered event carries this timestamp.
    pub fn contains_timestamp(&self, timestamp: i64) -> bool {
        self.events
            .iter()
            .any(|event| event.event_timestamp == timestamp)
    }

    /// Remove and return the event at `index`.
    ///
    /// Removal shifts only the entries after `index`, so a caller walking
    /// indices from the tail backward never invalidates a not-yet-visited
    /// position.
    pub fn remove(&mut self, index: usize) -> ListingEvent {
        self.events.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&ListingEvent> {
        self.events.get(index)
    }

    pub fn as_slice(&self) -> &[ListingEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListingEvent> {
        self.events.iter()
    }
}
