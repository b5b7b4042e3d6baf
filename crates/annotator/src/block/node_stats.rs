//! Node stats — cumulative per-round node statistics as CSV rows.
//!
//! Unlike the bounded blocks, this block is always open: its start pattern
//! matches every non-empty line and it re-arms after each `node statistics`
//! end marker. Between markers it accumulates instance-start events, round
//! numbers, and the warm/cold pool counts; when the marker fires it
//! crystallizes the state into one CSV row (with a one-time header).

use regex::Regex;

use super::instances::{capture_field, InstanceCountScanner};
use super::tracker::BlockTracker;
use super::traits::{BlockError, LineFilter};
use crate::size;

const HEADER: &str = "round,warm-size,leaked-cold,started-warm,started-aotc,\
started-bytecode,sys-mem,sys-mem-diff,heap-sys,heap-alloc\n";

/// Instance starts by category, accumulated for the life of the stream.
#[derive(Debug, Default)]
struct StartedInstances {
    warm: u64,
    cached: u64,
    bytecode: u64,
}

pub struct NodeStatsBlock {
    tracker: BlockTracker,
    counts: InstanceCountScanner,
    counts_line_re: Regex,
    started_re: Regex,
    round_re: Regex,
    sys_mem_re: Regex,
    heap_sys_re: Regex,
    heap_alloc_re: Regex,
    started: StartedInstances,
    round: u64,
    sys_mem: u64,
    sys_mem_diff: i64,
    heap_sys: u64,
    heap_alloc: u64,
    header_emitted: bool,
}

impl NodeStatsBlock {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            tracker: BlockTracker::new(
                "node stats",
                Regex::new(".")?,
                Regex::new("node statistics")?,
            ),
            counts: InstanceCountScanner::new()?,
            counts_line_re: Regex::new("end instances")?,
            started_re: Regex::new("start instance.*(warm|cached|bytecode)")?,
            round_re: Regex::new(r"committed.*round = (\d+)")?,
            sys_mem_re: Regex::new("sys mem = (.*) num GC")?,
            heap_sys_re: Regex::new("heap sys = (.*) heap num")?,
            heap_alloc_re: Regex::new("heap alloc = (.*) heap idle")?,
            started: StartedInstances::default(),
            round: 0,
            sys_mem: 0,
            sys_mem_diff: 0,
            heap_sys: 0,
            heap_alloc: 0,
            header_emitted: false,
        })
    }

    fn update(&mut self, line: &str) -> Result<(), BlockError> {
        self.tracker.update(line);

        // The tracker leaves `started` false on end-marker lines, so the
        // per-line reads never run against the stats line itself.
        if self.tracker.started() {
            if self.counts_line_re.is_match(line) {
                self.counts.scan(line);
            }
            self.read_started_instance(line);
            if let Some(round) = capture_field(&self.round_re, line) {
                self.round = round;
            }
        }

        if self.tracker.at_end() {
            self.read_node_stats(line)?;
        }
        Ok(())
    }

    fn read_started_instance(&mut self, line: &str) {
        let category = self
            .started_re
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());
        match category {
            Some("warm") => self.started.warm += 1,
            Some("cached") => self.started.cached += 1,
            Some("bytecode") => self.started.bytecode += 1,
            _ => {}
        }
    }

    /// End-marker lines are structurally guaranteed to carry all three
    /// memory fields; a missing field is a fatal format violation.
    fn read_node_stats(&mut self, line: &str) -> Result<(), BlockError> {
        let new_sys_mem = read_size(&self.sys_mem_re, line, "sys mem")?;
        self.sys_mem_diff = new_sys_mem as i64 - self.sys_mem as i64;
        self.sys_mem = new_sys_mem;
        self.heap_sys = read_size(&self.heap_sys_re, line, "heap sys")?;
        self.heap_alloc = read_size(&self.heap_alloc_re, line, "heap alloc")?;
        Ok(())
    }

    fn stats_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            self.round,
            self.counts.warm,
            self.counts.cold,
            self.started.warm,
            self.started.cached,
            self.started.bytecode,
            self.sys_mem,
            self.sys_mem_diff,
            self.heap_sys,
            self.heap_alloc,
        )
    }
}

fn read_size(re: &Regex, line: &str, field: &'static str) -> Result<u64, BlockError> {
    let text = re
        .captures(line)
        .and_then(|caps| caps.get(1))
        .ok_or(BlockError::MissingField(field))?;
    Ok(size::parse(text.as_str())?)
}

impl LineFilter for NodeStatsBlock {
    fn name(&self) -> &str {
        self.tracker.name()
    }

    fn filter(&mut self, line: &str) -> Result<Option<String>, BlockError> {
        self.update(line)?;
        if !self.tracker.at_end() {
            return Ok(None);
        }
        let row = self.stats_row();
        if self.header_emitted {
            Ok(Some(row))
        } else {
            self.header_emitted = true;
            tracing::debug!("emitting node stats header before first row");
            Ok(Some(format!("{HEADER}{row}")))
        }
    }
}
