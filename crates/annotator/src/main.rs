use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use annotator::conf::AnnotatorConfig;
use annotator::runtime::{boot, run};

/// Nodetail Annotator - stream annotation for node logs
#[derive(Parser, Debug)]
#[command(name = "annotator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input log file (reads stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (writes stdout if omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Config file (falls back to ANNOTATOR_CONFIG_FILE, then the default path)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    boot::init_logging(args.verbose, args.quiet);

    let config = AnnotatorConfig::load(args.config.as_deref().and_then(|p| p.to_str()))
        .context("failed to load configuration")?;
    let mut pipeline = boot::assemble(&config).context("failed to assemble pipeline")?;

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let stats = run::run(&mut pipeline, input, output).context("stream processing failed")?;

    info!(
        "Processed {} lines, {} emissions, {} aliases",
        stats.lines_read, stats.emissions, stats.aliases_built
    );
    Ok(())
}
