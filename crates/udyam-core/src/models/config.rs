//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ExtractionError;

/// Main configuration for the udyam pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UdyamConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Completion service configuration.
    pub llm: LlmConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Characters dropped from the start of the recognized text.
    ///
    /// The default of 200 strips the fixed header printed on Udyam
    /// certificates. Other templates may need 0.
    pub skip_leading_chars: usize,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Height in pixels of the row buckets used for reading order.
    pub row_height: f32,

    /// A vertical gap larger than this many median line heights starts a new block.
    pub block_gap_factor: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            skip_leading_chars: 200,
            keep_unk: false,
            row_height: 20.0,
            block_gap_factor: 1.5,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to feed to OCR (0 = unlimited).
    pub max_pages: usize,

    /// Use embedded text instead of OCR when the PDF carries at least
    /// `min_text_length` characters of it.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to consider the PDF text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            prefer_embedded_text: false,
            min_text_length: 50,
        }
    }
}

/// Completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name sent with each completion request.
    pub model: String,

    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// API key stored in the config file, used when the environment has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the process environment, then the config file.
    pub fn resolve_api_key(&self) -> Result<String, ExtractionError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key using a custom environment lookup.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, ExtractionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.api_key_env)
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
            })
            .ok_or_else(|| ExtractionError::MissingApiKey(self.api_key_env.clone()))
    }
}

/// OCR model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files (None = per-user data directory).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<PathBuf>,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Base URL `udyam models download` fetches the files from.
    ///
    /// The default points at a public mirror of the PP-OCR mobile ONNX
    /// exports; any directory serving the same three file names works.
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            base_url: "https://github.com/jakubmatias/incr/raw/main/models/mobile".to_string(),
        }
    }
}

impl ModelConfig {
    /// Download URL for a remote file name under [`ModelConfig::base_url`].
    pub fn download_url(&self, remote_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), remote_name)
    }

    /// File names of every model the OCR engine needs.
    pub fn files(&self) -> [&str; 3] {
        [
            self.detection_model.as_str(),
            self.recognition_model.as_str(),
            self.dictionary.as_str(),
        ]
    }

    /// Whether every model file exists under `dir`.
    pub fn is_complete(&self, dir: &Path) -> bool {
        self.files().iter().all(|name| dir.join(name).exists())
    }
}

impl UdyamConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Copy of this configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.llm.api_key = config.llm.api_key.as_deref().map(redact_secret);
        config
    }
}

/// Mask a secret, keeping a short prefix as a hint.
pub fn redact_secret(secret: &str) -> String {
    if secret.chars().count() > 8 {
        let hint: String = secret.chars().take(4).collect();
        format!("{}***", hint)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = UdyamConfig::default();
        assert_eq!(config.ocr.skip_leading_chars, 200);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.models.files(), ["det.onnx", "latin_rec.onnx", "latin_dict.txt"]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: UdyamConfig =
            serde_json::from_str(r#"{"ocr": {"skip_leading_chars": 0}}"#).unwrap();
        assert_eq!(config.ocr.skip_leading_chars, 0);
        assert!(!config.ocr.keep_unk);
        assert_eq!(config.pdf.max_pages, 10);
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert!(config.models.base_url.starts_with("https://"));
    }

    #[test]
    fn test_model_download_url() {
        let config: UdyamConfig =
            serde_json::from_str(r#"{"models": {"base_url": "http://mirror.local/ocr/"}}"#).unwrap();
        assert_eq!(config.models.download_url("det.onnx"), "http://mirror.local/ocr/det.onnx");
        assert_eq!(config.models.detection_model, "det.onnx");
    }

    #[test]
    fn test_api_key_prefers_environment() {
        let config = LlmConfig {
            api_key: Some("from-file".to_string()),
            ..LlmConfig::default()
        };
        let key = config
            .resolve_api_key_with(|name| {
                (name == "OPENAI_API_KEY").then(|| "from-env".to_string())
            })
            .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_api_key_falls_back_to_file() {
        let config = LlmConfig {
            api_key: Some("from-file".to_string()),
            ..LlmConfig::default()
        };
        let key = config.resolve_api_key_with(|_| Some("  ".to_string())).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig::default();
        let err = config.resolve_api_key_with(|_| None).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingApiKey(ref var) if var == "OPENAI_API_KEY"));
    }

    #[test]
    fn test_redacted_masks_key() {
        let mut config = UdyamConfig::default();
        config.llm.api_key = Some("sk-abcdefghijkl".to_string());
        assert_eq!(config.redacted().llm.api_key.as_deref(), Some("sk-a***"));
        assert_eq!(redact_secret("short"), "***");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = UdyamConfig::default();
        config.llm.model = "gpt-4o-mini".to_string();
        config.save(&path).unwrap();

        let loaded = UdyamConfig::from_file(&path).unwrap();
        assert_eq!(loaded.llm.model, "gpt-4o-mini");
        assert_eq!(loaded.ocr.skip_leading_chars, 200);
    }
}
