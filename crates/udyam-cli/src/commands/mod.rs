//! Subcommand implementations and the helpers they share.

pub mod config;
pub mod models;
pub mod parse;
pub mod process;

use std::path::{Path, PathBuf};

use console::style;
use tracing::debug;
use udyam_core::present::{EXTRACTION_FAILED, Entry, NOT_FOUND};
use udyam_core::{ExtractionOutcome, Field, NicLevel, Presentation, UdyamConfig};

/// Output format shared by the extraction commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Key/value lines
    Text,
    /// Extraction outcome as JSON
    Json,
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("udyam")
        .join("config.json")
}

/// The `--config` path, or the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(Path::to_path_buf).unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// An explicitly given file must exist.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<UdyamConfig> {
    let path = config_path(explicit);
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        return Ok(UdyamConfig::from_file(&path)?);
    }
    if explicit.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    Ok(UdyamConfig::default())
}

/// Print an outcome to stdout in the requested format.
pub fn print_outcome(outcome: &ExtractionOutcome, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => print_presentation(&Presentation::new(outcome.record.as_ref())),
    }
    Ok(())
}

fn print_presentation(presentation: &Presentation) {
    if presentation.is_failed() {
        println!("{}", style(EXTRACTION_FAILED).red().bold());
        return;
    }

    println!("{}", style("Extracted Information").bold());
    for entry in presentation.entries() {
        match entry {
            Entry::Heading(title) => println!("{}", style(format!("{}:", title)).bold()),
            Entry::Value { label, value, nested } => {
                let indent = if *nested { "  - " } else { "" };
                let value = match value {
                    Some(value) => style(value.clone()).green(),
                    None => style(NOT_FOUND.to_string()).red(),
                };
                println!("{}{}: {}", indent, style(label).bold(), value);
            }
        }
    }

    let total = Field::ALL.len() + NicLevel::ALL.len();
    let missing = presentation.entries().iter().filter(|e| e.is_missing()).count();
    println!();
    println!(
        "{} {} of {} fields found",
        style("ℹ").blue(),
        total - missing,
        total
    );
}
