//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use std::path::Path;

use crate::error::PdfError;
use crate::models::config::PdfConfig;
use crate::models::outcome::SourceType;
use image::DynamicImage;
use tracing::{debug, info, warn};

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type.
    fn analyze(&self, min_text_length: usize) -> PdfType;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract embedded images from a page (1-indexed).
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;
}

/// What a PDF yields for text recognition.
#[derive(Debug, Clone)]
pub enum PageContent {
    /// Page images, in page order, to run through OCR.
    Images(Vec<DynamicImage>),
    /// Embedded text used in place of OCR.
    EmbeddedText(String),
}

impl PageContent {
    pub fn source_type(&self) -> SourceType {
        match self {
            PageContent::Images(_) => SourceType::ScannedPdf,
            PageContent::EmbeddedText(_) => SourceType::TextPdf,
        }
    }
}

/// Decides whether a PDF is read through its page images or its embedded text.
pub struct PageSource {
    config: PdfConfig,
}

impl PageSource {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Number of pages to feed to OCR for a document of `page_count` pages.
    fn page_limit(&self, page_count: u32) -> u32 {
        match self.config.max_pages {
            0 => page_count,
            max => page_count.min(max as u32),
        }
    }

    /// Read a PDF from disk and pick its recognition input.
    pub fn load_file(&self, path: &Path) -> crate::Result<PageContent> {
        let data = std::fs::read(path)?;
        self.load(&data)
    }

    /// Load a PDF and pick its recognition input.
    pub fn load(&self, data: &[u8]) -> crate::Result<PageContent> {
        let mut extractor = PdfExtractor::new();
        extractor.load(data)?;

        let page_count = extractor.page_count();
        info!("PDF has {} pages", page_count);

        if self.config.prefer_embedded_text {
            let pdf_type = extractor.analyze(self.config.min_text_length);
            if matches!(pdf_type, PdfType::Text | PdfType::Hybrid) {
                debug!("{:?} PDF, using embedded text in place of OCR", pdf_type);
                return Ok(PageContent::EmbeddedText(extractor.extract_text()?));
            }
        }

        let limit = self.page_limit(page_count);
        let mut images = Vec::new();
        for page in 1..=limit {
            images.extend(extractor.extract_images(page)?);
        }

        // Some producers attach images outside the page resources
        if images.is_empty() {
            images = extractor.extract_all_images();
            images.truncate(limit as usize);
        }

        if !images.is_empty() {
            debug!("Collected {} page images from {} pages", images.len(), limit);
            return Ok(PageContent::Images(images));
        }

        let text = extractor.extract_text().unwrap_or_default();
        if text.trim().is_empty() {
            return Err(PdfError::ImageExtraction(
                "PDF has no decodable page images and no embedded text".to_string(),
            )
            .into());
        }

        warn!("PDF has no decodable page images; using its embedded text instead of OCR");
        Ok(PageContent::EmbeddedText(text))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory PDFs for tests.

    use lopdf::{Dictionary, Document, Object, Stream};

    fn name(value: &str) -> Object {
        Object::Name(value.as_bytes().to_vec())
    }

    fn build(page_count: usize, with_image: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut resources = Dictionary::new();
        if with_image {
            let mut image = Dictionary::new();
            image.set("Type", name("XObject"));
            image.set("Subtype", name("Image"));
            image.set("Width", 4_i64);
            image.set("Height", 2_i64);
            image.set("ColorSpace", name("DeviceGray"));
            image.set("BitsPerComponent", 8_i64);
            let image_id = doc.add_object(Stream::new(image, vec![0, 64, 128, 255, 255, 128, 64, 0]));

            let mut xobjects = Dictionary::new();
            xobjects.set("Im0", image_id);
            resources.set("XObject", xobjects);
        }
        let resources_id = doc.add_object(resources);

        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
                let mut page = Dictionary::new();
                page.set("Type", name("Page"));
                page.set("Parent", pages_id);
                page.set("Contents", content_id);
                page.set("Resources", resources_id);
                page.set(
                    "MediaBox",
                    Object::Array([0, 0, 595, 842].into_iter().map(Object::Integer).collect()),
                );
                doc.add_object(page).into()
            })
            .collect();

        let mut pages = Dictionary::new();
        pages.set("Type", name("Pages"));
        pages.set("Count", page_count as i64);
        pages.set("Kids", kids);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", name("Catalog"));
        catalog.set("Pages", pages_id);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    /// A PDF whose pages each show the same 4x2 grayscale image.
    pub fn gray_image_pdf(page_count: usize) -> Vec<u8> {
        build(page_count, true)
    }

    /// A one-page PDF with neither images nor text.
    pub fn blank_pdf() -> Vec<u8> {
        build(1, false)
    }

    /// A PDF with an empty page tree.
    pub fn pageless_pdf() -> Vec<u8> {
        build(0, false)
    }
}
