//! Tracker — the start/end region state machine shared by every block.

use regex::Regex;

/// Tracks whether the stream is currently inside a region bounded by a
/// start pattern and an end pattern.
///
/// `at_start` and `at_end` are transient: they describe only the line
/// passed to the most recent [`update`](BlockTracker::update) call.
/// `counter` counts start transitions for the life of the tracker and
/// never resets.
#[derive(Debug)]
pub struct BlockTracker {
    name: String,
    start: Regex,
    end: Regex,
    started: bool,
    at_start: bool,
    at_end: bool,
    counter: u64,
}

impl BlockTracker {
    pub fn new(name: impl Into<String>, start: Regex, end: Regex) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            started: false,
            at_start: false,
            at_end: false,
            counter: 0,
        }
    }

    /// Advance the state machine by one line.
    ///
    /// Start and end patterns are evaluated against the same line, in that
    /// order: a line may open and close a region at once.
    pub fn update(&mut self, line: &str) {
        self.at_start = false;
        self.at_end = false;

        if !self.started && self.start.is_match(line) {
            self.counter += 1;
            self.started = true;
            self.at_start = true;
            tracing::trace!(block = %self.name, counter = self.counter, "block start");
        }

        if self.started && self.end.is_match(line) {
            self.started = false;
            self.at_end = true;
            tracing::trace!(block = %self.name, counter = self.counter, "block end");
        }
    }

    /// True if the line just processed belongs to the region: the start
    /// line, the end line, or anything between.
    pub fn in_block(&self) -> bool {
        self.at_start || self.at_end || self.started
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn at_start(&self) -> bool {
        self.at_start
    }

    pub fn at_end(&self) -> bool {
        self.at_end
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(start: &str, end: &str) -> BlockTracker {
        BlockTracker::new(
            "test",
            Regex::new(start).unwrap(),
            Regex::new(end).unwrap(),
        )
    }

    // ── Basic transitions ───────────────────────────────────────

    #[test]
    fn test_outside_non_matching_line() {
        let mut t = tracker("begin", "finish");
        t.update("just noise");
        assert!(!t.in_block());
        assert!(!t.started());
        assert!(!t.at_start());
        assert!(!t.at_end());
        assert_eq!(t.counter(), 0);
    }

    #[test]
    fn test_start_transition() {
        let mut t = tracker("begin", "finish");
        t.update("begin work");
        assert!(t.at_start());
        assert!(!t.at_end());
        assert!(t.started());
        assert!(t.in_block());
        assert_eq!(t.counter(), 1);
    }

    #[test]
    fn test_end_transition() {
        let mut t = tracker("begin", "finish");
        t.update("begin work");
        t.update("middle");
        assert!(t.started());
        assert!(!t.at_start());

        t.update("finish work");
        assert!(t.at_end());
        assert!(!t.started());
        assert!(t.in_block(), "End line still belongs to the region");
    }

    #[test]
    fn test_line_after_end_is_outside() {
        let mut t = tracker("begin", "finish");
        t.update("begin");
        t.update("finish");
        t.update("after");
        assert!(!t.in_block());
        assert!(!t.at_end(), "at_end is transient");
    }

    // ── Counter behavior ────────────────────────────────────────

    #[test]
    fn test_counter_counts_disjoint_regions() {
        let mut t = tracker("begin", "finish");
        for _ in 0..3 {
            t.update("begin");
            t.update("inside");
            t.update("finish");
            t.update("between");
        }
        assert_eq!(t.counter(), 3);
    }

    #[test]
    fn test_start_match_inside_does_not_recount() {
        let mut t = tracker("begin", "finish");
        t.update("begin");
        t.update("begin again");
        t.update("begin once more");
        assert_eq!(t.counter(), 1);
        assert!(!t.at_start(), "Only the opening line is at_start");
    }

    // ── Zero-width blocks ───────────────────────────────────────

    #[test]
    fn test_start_and_end_on_same_line() {
        let mut t = tracker("begin", "finish");
        t.update("begin and finish at once");
        assert!(t.at_start());
        assert!(t.at_end());
        assert!(!t.started(), "Region closed within the same update");
        assert!(t.in_block());
        assert_eq!(t.counter(), 1);
    }

    #[test]
    fn test_end_pattern_alone_ignored_outside() {
        let mut t = tracker("begin", "finish");
        t.update("finish without begin");
        assert!(!t.in_block());
        assert!(!t.at_end());
    }

    // ── Flag transience ─────────────────────────────────────────

    #[test]
    fn test_at_start_resets_next_line() {
        let mut t = tracker("begin", "finish");
        t.update("begin");
        t.update("inside");
        assert!(!t.at_start());
        assert!(t.started());
    }
}
