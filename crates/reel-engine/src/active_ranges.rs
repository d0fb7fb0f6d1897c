// crates/reel-engine/src/active_ranges.rs
//
// Caller-declared set of presentation-time ranges that protect a clip's
// reader from eviction. Replaced wholesale via `set()` — the union is what
// matters, overlap between entries is permitted and never deduplicated.

use reel_core::TimeRange;

#[derive(Clone, Debug, Default)]
pub struct ActiveRangeTracker {
    ranges: Vec<TimeRange>,
}

impl ActiveRangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, ranges: Vec<TimeRange>) {
        self.ranges = ranges;
    }

    pub fn intersects_any(&self, range: &TimeRange) -> bool {
        self.ranges.iter().any(|r| r.intersects(range))
    }
}
