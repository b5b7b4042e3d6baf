//! Run — the synchronous line loop over the log stream.
//!
//! One line is read, rewritten by the alias rules in order, then offered to
//! each block in configured order before the next line is read. Blocks own
//! disjoint state, so ordering only affects output interleaving, never
//! classification.

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::debug;

use crate::alias::{AliasError, AliasReplacer};
use crate::block::{BlockError, LineFilter};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("stream I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("block '{name}' failed: {source}")]
    Block { name: String, source: BlockError },

    #[error(transparent)]
    Alias(#[from] AliasError),
}

/// Assembled stream pipeline: alias rules plus block instances, each
/// applied in configured order.
pub struct Pipeline {
    pub replacers: Vec<AliasReplacer>,
    pub blocks: Vec<Box<dyn LineFilter>>,
}

/// Counters for one stream run.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamStats {
    pub lines_read: u64,
    pub emissions: u64,
    pub aliases_built: u64,
}

/// Drive the pipeline over `input` until EOF, writing emissions verbatim
/// to `output`.
pub fn run<R: BufRead, W: Write>(
    pipeline: &mut Pipeline,
    input: R,
    mut output: W,
) -> Result<StreamStats, RunError> {
    let mut stats = StreamStats::default();

    for line in input.lines() {
        let mut line = line?;
        stats.lines_read += 1;

        for replacer in &mut pipeline.replacers {
            line = replacer.replace(&line)?;
        }

        for block in &mut pipeline.blocks {
            let emitted = block.filter(&line).map_err(|source| RunError::Block {
                name: block.name().to_string(),
                source,
            })?;
            if let Some(text) = emitted {
                output.write_all(text.as_bytes())?;
                stats.emissions += 1;
            }
        }
    }
    output.flush()?;

    stats.aliases_built = pipeline
        .replacers
        .iter()
        .map(|r| r.resolver().len() as u64)
        .sum();
    debug!(
        lines = stats.lines_read,
        emissions = stats.emissions,
        aliases = stats.aliases_built,
        "stream complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::AnnotatorConfig;
    use crate::runtime::boot::assemble;

    fn pipeline(toml_str: &str) -> Pipeline {
        let cfg: AnnotatorConfig = toml::from_str(toml_str).expect("Should parse");
        assemble(&cfg).expect("Should assemble")
    }

    fn run_lines(pipeline: &mut Pipeline, lines: &[&str]) -> (String, StreamStats) {
        let input = lines.join("\n");
        let mut output = Vec::new();
        let stats = run(pipeline, input.as_bytes(), &mut output).expect("Should run");
        (String::from_utf8(output).expect("UTF-8 output"), stats)
    }

    #[test]
    fn test_annotate_block_over_stream() {
        let mut p = pipeline(
            r#"
            [[block]]
            name = "init"
            start = "begin init"
            end = "end init"
            "#,
        );
        let (out, stats) = run_lines(
            &mut p,
            &["noise", "begin init", "loading", "end init", "more noise"],
        );
        assert_eq!(out, "\n[   1]\nbegin init\nloading\nend init\n");
        assert_eq!(stats.lines_read, 5);
        assert_eq!(stats.emissions, 3);
    }

    #[test]
    fn test_alias_rewrite_upstream_of_blocks() {
        let mut p = pipeline(
            r#"
            [[alias]]
            pattern = "instance ([0-9a-f]{8})"
            style = "sequential"
            source = ["alpha"]

            [[block]]
            name = "init"
            start = "begin"
            end = "end"
            "#,
        );
        let (out, stats) = run_lines(&mut p, &["begin", "instance deadbeef up", "end"]);
        assert!(out.contains("instance alpha up"), "Blocks see aliased lines: {}", out);
        assert_eq!(stats.aliases_built, 1);
    }

    #[test]
    fn test_multiple_blocks_fixed_order() {
        let mut p = pipeline(
            r#"
            [[block]]
            name = "stats"
            mode = "instance-stats"
            start = "begin"
            end = "end"

            [[block]]
            name = "pass"
            mode = "annotate"
            start = "begin"
            end = "end"
            "#,
        );
        let (out, _) = run_lines(&mut p, &["begin", "end warm = 2 cold = 1"]);
        // The stats block is configured first, so its record precedes the
        // pass-through of the end line.
        assert_eq!(out, "\n[   1]\nbegin\n1,2,1\nend warm = 2 cold = 1\n");
    }

    #[test]
    fn test_node_stats_end_to_end() {
        let mut p = pipeline(
            r#"
            [[block]]
            name = "node stats"
            mode = "node-stats"
            "#,
        );
        let (out, _) = run_lines(
            &mut p,
            &[
                "start X",
                "warm = 1",
                "cold = 0",
                "end X (node statistics) sys mem = 10 MB num GC = 1 \
heap sys = 1 MB heap num = 2 heap alloc = 500 KB heap idle = 3 MB",
            ],
        );
        assert_eq!(
            out,
            "round,warm-size,leaked-cold,started-warm,started-aotc,\
started-bytecode,sys-mem,sys-mem-diff,heap-sys,heap-alloc\n\
0,0,0,0,0,0,10000000,10000000,1000000,500000\n"
        );
    }

    #[test]
    fn test_block_error_carries_block_name() {
        let mut p = pipeline(
            r#"
            [[block]]
            name = "node stats"
            mode = "node-stats"
            "#,
        );
        let err = run(
            &mut p,
            "(node statistics) without memory fields\n".as_bytes(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Block { .. }));
        assert!(err.to_string().contains("node stats"));
    }

    #[test]
    fn test_empty_input() {
        let mut p = pipeline(
            r#"
            [[block]]
            name = "init"
            start = "begin"
            end = "end"
            "#,
        );
        let (out, stats) = run_lines(&mut p, &[]);
        assert!(out.is_empty());
        assert_eq!(stats.lines_read, 0);
        assert_eq!(stats.emissions, 0);
    }
}
