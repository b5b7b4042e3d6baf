//! Annotate — pass-through block with a numbered banner at region start.

use regex::Regex;

use super::tracker::BlockTracker;
use super::traits::{BlockError, LineFilter};

/// Passes lines inside the region through unchanged, prefixing the opening
/// line with a blank line and a `[NNNN]` occurrence banner.
pub struct AnnotatedBlock {
    tracker: BlockTracker,
}

impl AnnotatedBlock {
    pub fn new(name: impl Into<String>, start: Regex, end: Regex) -> Self {
        Self {
            tracker: BlockTracker::new(name, start, end),
        }
    }
}

/// Render a kept line: block-start lines get a blank line and a
/// right-aligned four-wide counter banner in front. No trailing newline —
/// callers append their own terminator or suffix.
pub(crate) fn render(tracker: &BlockTracker, line: &str) -> String {
    if tracker.at_start() {
        format!("\n[{:>4}]\n{}", tracker.counter(), line)
    } else {
        line.to_string()
    }
}

impl LineFilter for AnnotatedBlock {
    fn name(&self) -> &str {
        self.tracker.name()
    }

    fn filter(&mut self, line: &str) -> Result<Option<String>, BlockError> {
        self.tracker.update(line);
        if !self.tracker.in_block() {
            return Ok(None);
        }
        Ok(Some(format!("{}\n", render(&self.tracker, line))))
    }
}
