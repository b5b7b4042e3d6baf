//! Instances — warm/cold instance-count extraction over block regions.
//!
//! The node reports its instance pool as free-text `warm = N` / `cold = N`
//! fields on block-end lines. [`InstanceCountBlock`] annotates end lines
//! whose cold count moved since the last observed change;
//! [`InstanceStatsBlock`] projects the same state into one
//! `counter,warm,cold` record per completed block.

use std::str::FromStr;

use regex::Regex;

use super::annotate::render;
use super::tracker::BlockTracker;
use super::traits::{BlockError, LineFilter};

/// First capture group of `re` in `line`, parsed.
///
/// Returns `None` when the pattern does not match or the capture does not
/// parse — callers keep their previous value in that case.
pub(crate) fn capture_field<T: FromStr>(re: &Regex, line: &str) -> Option<T> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Scans lines for the two instance-count fields. A field that is absent
/// leaves the previous value in place.
#[derive(Debug)]
pub(crate) struct InstanceCountScanner {
    warm_re: Regex,
    cold_re: Regex,
    pub warm: i64,
    pub cold: i64,
}

impl InstanceCountScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            warm_re: Regex::new(r"warm = (-?\d+)")?,
            cold_re: Regex::new(r"cold = (-?\d+)")?,
            warm: 0,
            cold: 0,
        })
    }

    pub fn scan(&mut self, line: &str) {
        if let Some(warm) = capture_field(&self.warm_re, line) {
            self.warm = warm;
        }
        if let Some(cold) = capture_field(&self.cold_re, line) {
            self.cold = cold;
        }
    }
}

/// Annotates block-end lines whose cold-instance count moved since the
/// last observed change.
pub struct InstanceCountBlock {
    tracker: BlockTracker,
    counts: InstanceCountScanner,
    last_cold: i64,
    cold_changed: bool,
}

impl InstanceCountBlock {
    pub fn new(name: impl Into<String>, start: Regex, end: Regex) -> Result<Self, regex::Error> {
        Ok(Self {
            tracker: BlockTracker::new(name, start, end),
            counts: InstanceCountScanner::new()?,
            last_cold: 0,
            cold_changed: false,
        })
    }

    /// Advance tracker and extraction state by one line.
    ///
    /// Counts are read only on end lines, so mid-block occurrences of the
    /// field markers never disturb the last end-line values. `cold_changed`
    /// holds for the end line only; `last_cold` moves only on a change, so
    /// it is the last-observed baseline rather than the live value.
    pub(crate) fn advance(&mut self, line: &str) {
        self.tracker.update(line);
        self.cold_changed = false;
        if self.tracker.at_end() {
            self.counts.scan(line);
            if self.counts.cold != self.last_cold {
                self.cold_changed = true;
                self.last_cold = self.counts.cold;
                tracing::debug!(
                    block = %self.tracker.name(),
                    cold = self.counts.cold,
                    "cold instance count changed"
                );
            }
        }
    }

    pub(crate) fn tracker(&self) -> &BlockTracker {
        &self.tracker
    }

    pub fn warm(&self) -> i64 {
        self.counts.warm
    }

    pub fn cold(&self) -> i64 {
        self.counts.cold
    }

    pub fn cold_changed(&self) -> bool {
        self.cold_changed
    }
}

impl LineFilter for InstanceCountBlock {
    fn name(&self) -> &str {
        self.tracker.name()
    }

    fn filter(&mut self, line: &str) -> Result<Option<String>, BlockError> {
        self.advance(line);
        if !self.tracker.in_block() {
            return Ok(None);
        }
        let rendered = render(&self.tracker, line);
        if self.tracker.at_end() && self.cold_changed {
            Ok(Some(format!("{rendered}  num cold instances changed\n\n")))
        } else {
            Ok(Some(format!("{rendered}\n")))
        }
    }
}

/// Emits one `counter,warm,cold` record per completed block and nothing
/// else — a summary projection over [`InstanceCountBlock`] state.
pub struct InstanceStatsBlock {
    inner: InstanceCountBlock,
}

impl InstanceStatsBlock {
    pub fn new(name: impl Into<String>, start: Regex, end: Regex) -> Result<Self, regex::Error> {
        Ok(Self {
            inner: InstanceCountBlock::new(name, start, end)?,
        })
    }
}

impl LineFilter for InstanceStatsBlock {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn filter(&mut self, line: &str) -> Result<Option<String>, BlockError> {
        self.inner.advance(line);
        let tracker = self.inner.tracker();
        if tracker.at_end() {
            Ok(Some(format!(
                "{},{},{}\n",
                tracker.counter(),
                self.inner.warm(),
                self.inner.cold()
            )))
        } else {
            Ok(None)
        }
    }
}
