use flowlens_types::{Event, EventKind};

/// Selection over a normalized timeline: kind and inclusive time window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub kind: Option<EventKind>,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn start_ms(mut self, start_ms: u64) -> Self {
        self.start_ms = Some(start_ms);
        self
    }

    pub fn end_ms(mut self, end_ms: u64) -> Self {
        self.end_ms = Some(end_ms);
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(kind) = self.kind
            && event.kind() != kind
        {
            return false;
        }
        if let Some(start) = self.start_ms
            && event.relative_time_ms < start
        {
            return false;
        }
        if let Some(end) = self.end_ms
            && event.relative_time_ms > end
        {
            return false;
        }
        true
    }

    /// Matching events in timeline order
    pub fn apply<'a>(&'a self, events: &'a [Event]) -> impl Iterator<Item = &'a Event> + 'a {
        events.iter().filter(move |e| self.matches(e))
    }
}
