//! Strictly increasing sample timestamps.

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Hands out timestamps that never repeat or go backwards, even when the
/// wall clock does.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampClock {
    last: Option<i64>,
}

impl TimestampClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start after an already-stored timestamp.
    pub fn starting_after(last: i64) -> Self {
        Self { last: Some(last) }
    }

    pub fn last(&self) -> Option<i64> {
        self.last
    }

    pub fn is_seeded(&self) -> bool {
        self.last.is_some()
    }

    /// Next timestamp given the current wall time. Not recorded until
    /// [`commit`](Self::commit) is called.
    pub fn peek(&self, now_ms: i64) -> i64 {
        match self.last {
            Some(last) => now_ms.max(last + 1),
            None => now_ms,
        }
    }

    pub fn commit(&mut self, timestamp: i64) {
        self.last = Some(self.last.map_or(timestamp, |last| last.max(timestamp)));
    }
}
