//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use udyam_core::UdyamConfig;
use udyam_core::models::config::redact_secret;

use super::{config_path, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration (API key redacted)
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "ocr.skip_leading_chars")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (parsed as JSON, otherwise taken as a string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(explicit),
        ConfigCommand::Init(init_args) => init_config(init_args, explicit),
        ConfigCommand::Get { key } => get_config(&key, explicit),
        ConfigCommand::Set { key, value } => set_config(&key, &value, explicit),
        ConfigCommand::Path => show_path(explicit),
    }
}

fn show_config(explicit: Option<&Path>) -> anyhow::Result<()> {
    if !config_path(explicit).exists() {
        eprintln!("{} No config file found, showing defaults.", style("ℹ").blue());
    }

    let config = load_config(explicit)?;
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    Ok(())
}

fn init_config(args: InitArgs, explicit: Option<&Path>) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| config_path(explicit));

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    UdyamConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// Look up a dotted key in the serialized configuration.
fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

fn get_config(key: &str, explicit: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(explicit)?;
    let json = serde_json::to_value(&config)?;

    let value = lookup(&json, key).ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    match (key, value) {
        ("llm.api_key", Value::String(secret)) => println!("{}", redact_secret(secret)),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }

    Ok(())
}

fn set_config(key: &str, value: &str, explicit: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path(explicit);
    let config = if path.exists() {
        UdyamConfig::from_file(&path)?
    } else {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        UdyamConfig::default()
    };

    // Parse the value
    let parsed_value: Value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    // Convert config to JSON, modify, and convert back
    let mut json = serde_json::to_value(&config)?;

    let (parent_key, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };
    let parent = match parent_key {
        Some(parent_key) => parent_key
            .split('.')
            .try_fold(&mut json, |current, part| current.get_mut(part))
            .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?,
        None => &mut json,
    };
    let Some(object) = parent.as_object_mut() else {
        anyhow::bail!("Cannot set value at non-object path");
    };
    object.insert(leaf.to_string(), parsed_value.clone());

    let config: UdyamConfig = serde_json::from_value(json)?;
    config.save(&path)?;

    let shown = match (key, &parsed_value) {
        ("llm.api_key", Value::String(secret)) => redact_secret(secret),
        _ => serde_json::to_string(&parsed_value)?,
    };
    println!("{} Set {} = {}", style("✓").green(), key, shown);

    Ok(())
}

fn show_path(explicit: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path(explicit);

    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'udyam config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_dotted_key() {
        let json = serde_json::to_value(UdyamConfig::default()).unwrap();
        assert_eq!(lookup(&json, "ocr.skip_leading_chars"), Some(&Value::from(200)));
        assert_eq!(lookup(&json, "llm.model"), Some(&Value::from("gpt-4o")));
        assert!(lookup(&json, "llm.missing").is_none());
        assert!(lookup(&json, "ocr.skip_leading_chars.deeper").is_none());
    }
}
