//! Core library for Udyam Registration certificate extraction.
//!
//! This crate provides:
//! - PDF loading (page images or embedded text)
//! - OCR into a page / block / line / word hierarchy
//! - LLM-assisted field extraction with lenient JSON recovery
//! - A fixed key/value presentation of the extracted record

pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod present;

pub use error::{Result, UdyamError};
pub use extraction::{
    CompletionClient, CompletionRequest, ExtractionReport, Extractor, LenientJsonParser, OpenAiClient,
    ResponseParser, parse_response,
};
pub use models::config::UdyamConfig;
pub use models::outcome::{ExtractionMetadata, ExtractionOutcome, OutcomeStatus, SourceType};
pub use models::record::{ExtractedRecord, Field, NicCodes, NicLevel};
pub use ocr::{OcrDocument, TextSource, load_page_image, recognized_text};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{PageContent, PageSource, PdfProcessor, PdfType};
pub use present::Presentation;
