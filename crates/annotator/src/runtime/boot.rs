//! Boot — logging init and pipeline assembly from configuration.

use regex::Regex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::alias::{builders, AliasReplacer, AliasResolver};
use crate::block::{
    AnnotatedBlock, InstanceCountBlock, InstanceStatsBlock, LineFilter, NodeStatsBlock,
};
use crate::conf::{AliasConfig, AliasStyle, AnnotatorConfig, BlockConfig, BlockMode, ConfError};
use crate::runtime::run::Pipeline;

/// Initialise the tracing / logging subsystem. Diagnostics go to stderr so
/// stdout stays a clean annotation stream. `RUST_LOG` overrides the
/// verbosity flags when set.
pub fn init_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "annotator=error"
    } else {
        match verbose {
            0 => "annotator=info",
            1 => "annotator=debug",
            _ => "annotator=trace",
        }
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Validate the config and build the stream pipeline: compiled alias rules
/// and block instances, in configured order.
pub fn assemble(config: &AnnotatorConfig) -> Result<Pipeline, ConfError> {
    config.validate()?;

    let mut replacers = Vec::with_capacity(config.aliases.len());
    for alias in &config.aliases {
        replacers.push(build_replacer(alias)?);
    }

    let mut blocks: Vec<Box<dyn LineFilter>> = Vec::with_capacity(config.blocks.len());
    for block in &config.blocks {
        blocks.push(build_block(block)?);
        info!(
            "Configured block '{}' ({:?})",
            block.name, block.mode
        );
    }

    Ok(Pipeline { replacers, blocks })
}

fn build_replacer(config: &AliasConfig) -> Result<AliasReplacer, ConfError> {
    let pattern = Regex::new(&config.pattern).map_err(|source| ConfError::Pattern {
        rule: config.pattern.clone(),
        source,
    })?;
    let builder = match config.style {
        AliasStyle::Sequential => builders::sequential(),
        AliasStyle::Numbered => builders::numbered(&config.prefix),
    };
    let resolver = AliasResolver::new(config.source.clone(), builder);
    Ok(AliasReplacer::new(pattern, config.group, resolver))
}

fn build_block(config: &BlockConfig) -> Result<Box<dyn LineFilter>, ConfError> {
    let pattern = |text: &str| {
        Regex::new(text).map_err(|source| ConfError::Pattern {
            rule: config.name.clone(),
            source,
        })
    };
    let internal = |source: regex::Error| ConfError::Pattern {
        rule: config.name.clone(),
        source,
    };

    Ok(match config.mode {
        BlockMode::Annotate => Box::new(AnnotatedBlock::new(
            &config.name,
            pattern(&config.start)?,
            pattern(&config.end)?,
        )),
        BlockMode::InstanceCount => Box::new(
            InstanceCountBlock::new(&config.name, pattern(&config.start)?, pattern(&config.end)?)
                .map_err(internal)?,
        ),
        BlockMode::InstanceStats => Box::new(
            InstanceStatsBlock::new(&config.name, pattern(&config.start)?, pattern(&config.end)?)
                .map_err(internal)?,
        ),
        BlockMode::NodeStats => Box::new(NodeStatsBlock::new().map_err(internal)?),
    })
}
