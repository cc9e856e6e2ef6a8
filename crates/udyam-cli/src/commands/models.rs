//! Models command - download and manage OCR models.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use udyam_core::models::config::ModelConfig;

use super::load_config;

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List the models the OCR engine needs
    List,

    /// Download models
    Download(DownloadArgs),

    /// Check model status
    Status,

    /// Remove downloaded models
    Clean,
}

#[derive(Args)]
struct DownloadArgs {
    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,

    /// Base URL the model files are fetched from (overrides models.base_url)
    #[arg(long)]
    base_url: Option<String>,
}

/// Role of a model file in the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelRole {
    Detection,
    Recognition,
    Dictionary,
}

/// Model information for one downloadable file.
struct ModelInfo {
    role: ModelRole,
    remote_name: &'static str,
    size_bytes: u64,
    description: &'static str,
}

const MODELS: [ModelInfo; 3] = [
    ModelInfo {
        role: ModelRole::Detection,
        remote_name: "det.onnx",
        size_bytes: 4_500_000,
        description: "PP-OCRv3 mobile detection",
    },
    ModelInfo {
        role: ModelRole::Recognition,
        remote_name: "latin_rec.onnx",
        size_bytes: 7_500_000,
        description: "Latin recognition",
    },
    ModelInfo {
        role: ModelRole::Dictionary,
        remote_name: "latin_dict.txt",
        size_bytes: 2_000,
        description: "Latin character dictionary",
    },
];

impl ModelInfo {
    /// Local file name, as configured under `models`.
    fn local_name<'a>(&self, config: &'a ModelConfig) -> &'a str {
        match self.role {
            ModelRole::Detection => &config.detection_model,
            ModelRole::Recognition => &config.recognition_model,
            ModelRole::Dictionary => &config.dictionary,
        }
    }

    /// Whether a file of `size` bytes looks like a complete download.
    fn is_complete_size(&self, size: u64) -> bool {
        size > self.size_bytes / 2
    }
}

/// Default model directory.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("udyam")
        .join("models")
}

pub async fn run(args: ModelsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?.models;
    let model_dir = config.model_dir.clone().unwrap_or_else(default_model_dir);

    match args.command {
        ModelsCommand::List => list_models(&config),
        ModelsCommand::Download(download_args) => download_models(download_args, &config, &model_dir).await,
        ModelsCommand::Status => check_status(&config, &model_dir),
        ModelsCommand::Clean => clean_models(&config, &model_dir),
    }
}

fn list_models(config: &ModelConfig) -> anyhow::Result<()> {
    println!("{}", style("OCR Models").bold());
    println!();

    let total_size: u64 = MODELS.iter().map(|m| m.size_bytes).sum();
    println!(
        "{} {} {}",
        style("▸ mobile").bold().cyan(),
        format_size(total_size),
        style("- PP-OCR detection with Latin recognition").dim()
    );

    for model in &MODELS {
        println!(
            "    {:<20} {:>10}  {}",
            model.local_name(config),
            format_size(model.size_bytes),
            model.description
        );
    }

    println!();
    println!("Commands:");
    println!("  udyam models download    Download models (~12MB)");
    println!("  udyam models status      Check downloaded models");

    Ok(())
}

async fn download_models(args: DownloadArgs, config: &ModelConfig, model_dir: &Path) -> anyhow::Result<()> {
    let output_dir = args.output.clone().unwrap_or_else(|| model_dir.to_path_buf());
    let source = ModelConfig {
        base_url: args.base_url.clone().unwrap_or_else(|| config.base_url.clone()),
        ..config.clone()
    };
    fs::create_dir_all(&output_dir)?;

    println!(
        "{} Downloading OCR models from {} to {}",
        style("ℹ").blue(),
        source.base_url,
        output_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("udyam-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for model in &MODELS {
        let filename = model.local_name(config);
        let path = output_dir.join(filename);

        // Check if already exists
        if path.exists() && !args.force {
            let metadata = fs::metadata(&path)?;
            if model.is_complete_size(metadata.len()) {
                println!(
                    "  {} {} (already exists, {})",
                    style("✓").green(),
                    filename,
                    format_size(metadata.len())
                );
                skip_count += 1;
                continue;
            }
        }

        let url = source.download_url(model.remote_name);

        let pb = multi_progress.add(ProgressBar::new(model.size_bytes));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(filename.to_string());

        match download_file(&client, &url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), filename));
                success_count += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    // Summary
    if error_count == 0 {
        println!("{} Models downloaded successfully!", style("✓").green().bold());
        if skip_count > 0 {
            println!("   {} downloaded, {} already present", success_count, skip_count);
        }
        if args.output.is_some() && output_dir != model_dir {
            println!();
            println!(
                "{} To use these models, run: udyam config set models.model_dir {}",
                style("ℹ").blue(),
                output_dir.display()
            );
        }
    } else {
        println!("{} Download completed with errors", style("⚠").yellow().bold());
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        println!();
        println!("Retry with: udyam models download --force");
    }

    // Verify all models
    println!();
    check_status(config, &output_dir)?;

    Ok(())
}

async fn download_file(client: &reqwest::Client, url: &str, path: &Path, pb: &ProgressBar) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    // Write to a temp file and rename once complete
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

fn check_status(config: &ModelConfig, model_dir: &Path) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("{} {}", style("▸ mobile").bold(), model_dir.display());

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for model in &MODELS {
        let filename = model.local_name(config);
        let path = model_dir.join(filename);
        let (status, size_str) = if path.exists() {
            let size = fs::metadata(&path)?.len();
            total_size += size;

            if model.is_complete_size(size) {
                (style("✓").green(), format_size(size))
            } else {
                all_present = false;
                (style("⚠").yellow(), format!("{} (incomplete?)", format_size(size)))
            }
        } else {
            all_present = false;
            (style("✗").red(), "missing".to_string())
        };

        println!("    {} {:<25} {:>10}", status, filename, size_str);
    }

    if all_present {
        println!("    {} Ready ({} total)", style("✓").green(), format_size(total_size));
    } else {
        println!(
            "    {} Run 'udyam models download' to download",
            style("⚠").yellow()
        );
    }

    Ok(())
}

fn clean_models(config: &ModelConfig, model_dir: &Path) -> anyhow::Result<()> {
    if !model_dir.exists() {
        println!("{} No model files to remove.", style("ℹ").blue());
        return Ok(());
    }

    println!("{} Cleaning models in {}...", style("⚠").yellow(), model_dir.display());

    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    for model in &MODELS {
        let filename = model.local_name(config);
        let path = model_dir.join(filename);
        if path.exists() {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path)?;
            total_removed += 1;
            total_freed += size;
            println!("  {} Removed {}", style("✓").green(), filename);
        }
    }

    // Leftovers from interrupted downloads
    for entry in fs::read_dir(model_dir)?.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "tmp") {
            fs::remove_file(&path)?;
        }
    }

    if total_removed > 0 {
        println!();
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            total_removed,
            format_size(total_freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(2_000), "2.0KB");
        assert_eq!(format_size(4_500_000), "4.5MB");
    }

    #[test]
    fn test_local_names_follow_config() {
        let config = ModelConfig {
            recognition_model: "en_rec.onnx".to_string(),
            ..ModelConfig::default()
        };
        let names: Vec<&str> = MODELS.iter().map(|m| m.local_name(&config)).collect();
        assert_eq!(names, ["det.onnx", "en_rec.onnx", "latin_dict.txt"]);
    }

    #[test]
    fn test_download_urls_follow_base_url() {
        let config = ModelConfig {
            base_url: "http://127.0.0.1:8000/models/".to_string(),
            ..ModelConfig::default()
        };
        let urls: Vec<String> = MODELS.iter().map(|m| config.download_url(m.remote_name)).collect();
        assert_eq!(
            urls,
            [
                "http://127.0.0.1:8000/models/det.onnx",
                "http://127.0.0.1:8000/models/latin_rec.onnx",
                "http://127.0.0.1:8000/models/latin_dict.txt",
            ]
        );
    }

    #[test]
    fn test_complete_size_threshold() {
        assert!(MODELS[0].is_complete_size(4_000_000));
        assert!(!MODELS[0].is_complete_size(1_000));
    }
}
