//! Serializable summary of one extraction run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::ExtractedRecord;

/// Whether structured data was recovered from the model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The response contained a JSON object.
    Extracted,
    /// The response neither was nor contained a JSON object.
    NoData,
}

/// Where the text handed to the model came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// OCR over images embedded in a PDF.
    ScannedPdf,
    /// Embedded PDF text (no decodable page images).
    TextPdf,
    /// OCR over an image file.
    Image,
    /// A model response supplied directly.
    Response,
    #[default]
    Unknown,
}

/// Extraction metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Source document type.
    pub source_type: SourceType,

    /// Model that produced the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Characters of recognized text sent to the model.
    pub raw_text_chars: usize,

    /// Processing time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,

    /// When the extraction finished.
    pub extracted_at: DateTime<Utc>,

    /// Schema keys that were not found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,

    /// Warnings or issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ExtractionMetadata {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            model: None,
            raw_text_chars: 0,
            processing_time_ms: None,
            extracted_at: Utc::now(),
            missing_fields: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Machine-readable result of one extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub status: OutcomeStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ExtractedRecord>,

    pub metadata: ExtractionMetadata,
}

impl ExtractionOutcome {
    /// Build an outcome from a parse result, filling in the missing fields.
    pub fn new(record: Option<ExtractedRecord>, mut metadata: ExtractionMetadata) -> Self {
        let status = match &record {
            Some(record) => {
                metadata.missing_fields = record
                    .missing_keys()
                    .into_iter()
                    .map(String::from)
                    .collect();
                OutcomeStatus::Extracted
            }
            None => OutcomeStatus::NoData,
        };
        Self {
            status,
            record,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_no_data_outcome_json() {
        let outcome = ExtractionOutcome::new(None, ExtractionMetadata::new(SourceType::Response));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], json!("no_data"));
        assert!(value.get("record").is_none());
        assert_eq!(value["metadata"]["source_type"], json!("response"));
    }

    #[test]
    fn test_extracted_outcome_lists_missing_fields() {
        let record = ExtractedRecord {
            enterprise_name: Some("Acme".to_string()),
            ..ExtractedRecord::default()
        };
        let outcome = ExtractionOutcome::new(Some(record), ExtractionMetadata::new(SourceType::ScannedPdf));
        assert_eq!(outcome.status, OutcomeStatus::Extracted);
        assert_eq!(outcome.metadata.missing_fields.len(), 12);
        assert!(!outcome.metadata.missing_fields.contains(&"ENTERPRISE_NAME".to_string()));
    }
}
