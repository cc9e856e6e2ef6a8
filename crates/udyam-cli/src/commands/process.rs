//! Process command - OCR a certificate and extract its fields.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use udyam_core::models::config::UdyamConfig;
use udyam_core::{
    ExtractionMetadata, ExtractionOutcome, Extractor, OcrDocument, OpenAiClient, PageContent, PageSource,
    PureOcrEngine, SourceType, TextSource, UdyamError, load_page_image, recognized_text,
};

use super::models::default_model_dir;
use super::{OutputFormat, load_config, print_outcome};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Completion model (overrides llm.model)
    #[arg(long)]
    llm_model: Option<String>,

    /// Send the text to the model without asking
    #[arg(short, long)]
    yes: bool,

    /// Do not show the recognized text
    #[arg(short, long)]
    quiet: bool,

    /// Stop after OCR and print the recognized text
    #[arg(long, conflicts_with_all = ["yes", "quiet"])]
    ocr_only: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model) = &args.llm_model {
        config.llm.model = model.clone();
    }

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    // Resolve the key before spending time on OCR
    let client = if args.ocr_only {
        None
    } else {
        let client = OpenAiClient::from_config(&config.llm).map_err(|e| UdyamError::Config(e.to_string()))?;
        Some(client)
    };

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let (document, source_type) = match extension.as_str() {
        "pdf" => recognize_pdf(&args, &config, &pb)?,
        "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" => recognize_image(&args, &config, &pb)?,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };
    pb.finish_and_clear();

    let raw_text = recognized_text(&document, config.ocr.skip_leading_chars);
    let mut warnings = Vec::new();
    if raw_text.trim().is_empty() {
        warnings.push(format!(
            "no text left after skipping {} leading characters",
            config.ocr.skip_leading_chars
        ));
    }

    let Some(client) = client else {
        println!("{}", raw_text);
        return Ok(());
    };

    if !args.quiet {
        show_raw_text(&raw_text, &document, config.ocr.skip_leading_chars);
    }

    if !args.yes && !confirm()? {
        eprintln!("{} Cancelled; nothing was sent.", style("ℹ").blue());
        return Ok(());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Extracting structured data with {}...", config.llm.model));
    pb.enable_steady_tick(Duration::from_millis(100));

    let extractor = Extractor::new(client, config.llm.model.as_str());
    let report = extractor.extract(&raw_text).await;
    pb.finish_and_clear();
    let report = report?;

    debug!(
        "Model response ({} chars): {}",
        report.raw_response.chars().count(),
        report.raw_response
    );

    let mut metadata = ExtractionMetadata::new(source_type);
    metadata.model = Some(report.model.clone());
    metadata.raw_text_chars = raw_text.chars().count();
    metadata.processing_time_ms = Some(start.elapsed().as_millis() as u64);
    metadata.warnings = warnings;

    let outcome = ExtractionOutcome::new(report.record().cloned(), metadata);
    print_outcome(&outcome, args.format)?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn recognize_pdf(
    args: &ProcessArgs,
    config: &UdyamConfig,
    pb: &ProgressBar,
) -> anyhow::Result<(OcrDocument, SourceType)> {
    pb.set_message("Loading PDF...");

    let content = PageSource::new(config.pdf.clone()).load_file(&args.input)?;
    let source_type = content.source_type();

    let document = match content {
        PageContent::EmbeddedText(text) => OcrDocument::from_text(&text),
        PageContent::Images(images) => {
            let engine = load_engine(args, config, pb)?;
            pb.set_message(format!("Running OCR on {} page images...", images.len()));
            engine.recognize(&images)?
        }
    };

    Ok((document, source_type))
}

fn recognize_image(
    args: &ProcessArgs,
    config: &UdyamConfig,
    pb: &ProgressBar,
) -> anyhow::Result<(OcrDocument, SourceType)> {
    pb.set_message("Loading image...");
    let image = load_page_image(&args.input)?;

    let engine = load_engine(args, config, pb)?;
    pb.set_message("Running OCR...");
    let document = engine.recognize(std::slice::from_ref(&image))?;

    Ok((document, SourceType::Image))
}

/// Build the OCR engine once for this run.
fn load_engine(args: &ProcessArgs, config: &UdyamConfig, pb: &ProgressBar) -> anyhow::Result<PureOcrEngine> {
    let model_dir = args
        .model_dir
        .clone()
        .or_else(|| config.models.model_dir.clone())
        .unwrap_or_else(default_model_dir);

    if !config.models.is_complete(&model_dir) {
        anyhow::bail!(
            "OCR models not found at {}.\n\n\
             Run 'udyam models download' to download them.",
            model_dir.display()
        );
    }

    pb.set_message("Loading OCR models...");
    debug!("Using models from {}", model_dir.display());
    Ok(PureOcrEngine::from_dir(&model_dir, &config.models, &config.ocr)?)
}

/// Print the recognized text to stderr so stdout keeps only the result.
fn show_raw_text(raw_text: &str, document: &OcrDocument, skipped: usize) {
    eprintln!("{}", style("Extracted Raw Text").bold());
    eprintln!(
        "{}",
        style(format!(
            "{} words recognized, first {} characters skipped",
            document.word_count(),
            skipped
        ))
        .dim()
    );
    eprintln!();
    eprintln!("{}", raw_text);
    eprintln!();

    if raw_text.is_empty() && document.word_count() > 0 {
        warn!("Set ocr.skip_leading_chars to a smaller value to keep the recognized text");
    }
}

/// Ask before sending the text to the completion service.
fn confirm() -> anyhow::Result<bool> {
    let term = Term::stderr();
    if !term.is_term() {
        anyhow::bail!("Not running interactively; pass --yes to send the text to the model");
    }

    term.write_str("Process with LLM? [y/N] ")?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
