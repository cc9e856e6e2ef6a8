//! Error types for the udyam-core library.

use thiserror::Error;

/// Main error type for the udyam library.
#[derive(Error, Debug)]
pub enum UdyamError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Nothing to recognize.
    #[error("no pages to recognize")]
    NoPages,
}

/// Errors related to LLM-assisted field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The model response neither is nor contains a JSON object.
    #[error("no structured data found in model response")]
    NoData,

    /// Transport failure talking to the completion service.
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion service answered with a non-success status.
    #[error("completion service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The completion service answered with an unreadable body.
    #[error("failed to decode completion response: {0}")]
    Decode(String),

    /// No API key could be resolved for the completion service.
    #[error("missing API key (set {0} or llm.api_key in the config file)")]
    MissingApiKey(String),
}

impl ExtractionError {
    /// Whether this is the designed "no data" outcome rather than a failure
    /// of the surrounding machinery.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Result type for the udyam library.
pub type Result<T> = std::result::Result<T, UdyamError>;
