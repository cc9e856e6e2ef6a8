//! Parse command - interpret a saved model response offline.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use udyam_core::{ExtractionMetadata, ExtractionOutcome, SourceType, parse_response};

use super::{OutputFormat, print_outcome};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// File holding the model response ("-" reads stdin)
    #[arg(required = true)]
    response: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    let raw = read_response(&args.response)?;
    info!("Parsing {} chars of model response", raw.chars().count());

    let record = parse_response(&raw).ok();
    let outcome = ExtractionOutcome::new(record, ExtractionMetadata::new(SourceType::Response));
    print_outcome(&outcome, args.format)
}

fn read_response(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }

    if !path.exists() {
        anyhow::bail!("Response file not found: {}", path.display());
    }
    Ok(fs::read_to_string(path)?)
}
