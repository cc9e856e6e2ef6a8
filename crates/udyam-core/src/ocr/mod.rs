//! OCR: page images to a page → block → line → word hierarchy.

mod layout;
#[cfg(feature = "native")]
mod pure_engine;

pub use layout::LayoutGrouper;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OcrError;

/// Trait for anything that turns page images into recognized text.
pub trait TextSource {
    /// Recognize every page, in order.
    fn recognize(&self, pages: &[DynamicImage]) -> Result<OcrDocument, OcrError>;
}

/// A detected text region with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    /// Height of the axis-aligned bounding rectangle.
    pub fn height(&self) -> f32 {
        let (_, min_y, _, max_y) = self.rect();
        max_y - min_y
    }
}

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub value: String,
    pub confidence: f32,
}

/// Words sharing one text row, left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub words: Vec<OcrWord>,
}

/// Consecutive lines without a large vertical gap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrBlock {
    pub lines: Vec<OcrLine>,
}

/// Recognized content of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Image dimensions (width, height); zero for text-only pages.
    pub size: (u32, u32),
    pub blocks: Vec<OcrBlock>,
}

/// Recognized content of a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    pub pages: Vec<OcrPage>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrDocument {
    /// Build a single-page document from plain text: one block, one line per
    /// text line, words split on whitespace.
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|line| OcrLine {
                words: line
                    .split_whitespace()
                    .map(|word| OcrWord {
                        value: word.to_string(),
                        confidence: 1.0,
                    })
                    .collect(),
            })
            .filter(|line| !line.words.is_empty())
            .collect();

        Self {
            pages: vec![OcrPage {
                number: 1,
                size: (0, 0),
                blocks: vec![OcrBlock { lines }],
            }],
            processing_time_ms: 0,
        }
    }

    /// Every word across all pages, blocks and lines.
    pub fn words(&self) -> impl Iterator<Item = &OcrWord> {
        self.pages
            .iter()
            .flat_map(|page| &page.blocks)
            .flat_map(|block| &block.lines)
            .flat_map(|line| &line.words)
    }

    /// All words joined with newlines.
    pub fn raw_text(&self) -> String {
        self.words()
            .map(|word| word.value.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }
}

/// Drop the first `count` characters of `text`.
///
/// Counts Unicode scalar values, so multi-byte text is never split mid-character.
pub fn trim_leading(text: &str, count: usize) -> &str {
    text.char_indices()
        .nth(count)
        .map_or("", |(index, _)| &text[index..])
}

/// Decode an image file into a page for recognition.
pub fn load_page_image(path: &Path) -> crate::Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Flatten a document and drop the configured leading characters.
pub fn recognized_text(document: &OcrDocument, skip_leading_chars: usize) -> String {
    let raw = document.raw_text();
    let trimmed = trim_leading(&raw, skip_leading_chars);
    if trimmed.is_empty() && !raw.is_empty() {
        warn!(
            "Recognized text ({} chars) is shorter than ocr.skip_leading_chars ({}); nothing left to extract from",
            raw.chars().count(),
            skip_leading_chars
        );
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(value: &str) -> OcrWord {
        OcrWord {
            value: value.to_string(),
            confidence: 0.9,
        }
    }

    fn line(words: &[&str]) -> OcrLine {
        OcrLine {
            words: words.iter().map(|w| word(w)).collect(),
        }
    }

    #[test]
    fn test_raw_text_joins_words_across_pages() {
        let document = OcrDocument {
            pages: vec![
                OcrPage {
                    number: 1,
                    size: (100, 100),
                    blocks: vec![
                        OcrBlock {
                            lines: vec![line(&["UDYAM", "REGISTRATION"]), line(&["CERTIFICATE"])],
                        },
                        OcrBlock {
                            lines: vec![line(&["ACME"])],
                        },
                    ],
                },
                OcrPage {
                    number: 2,
                    size: (100, 100),
                    blocks: vec![OcrBlock {
                        lines: vec![line(&["Page", "2"])],
                    }],
                },
            ],
            processing_time_ms: 5,
        };

        assert_eq!(
            document.raw_text(),
            "UDYAM\nREGISTRATION\nCERTIFICATE\nACME\nPage\n2"
        );
        assert_eq!(document.word_count(), 6);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(OcrDocument::default().raw_text(), "");
    }

    #[test]
    fn test_from_text() {
        let document = OcrDocument::from_text("Name of Enterprise  ACME\n\n  Type: Micro ");
        assert_eq!(document.pages.len(), 1);
        assert_eq!(document.pages[0].blocks[0].lines.len(), 2);
        assert_eq!(document.raw_text(), "Name\nof\nEnterprise\nACME\nType:\nMicro");
    }

    #[test]
    fn test_trim_leading_counts_chars() {
        assert_eq!(trim_leading("abcdef", 2), "cdef");
        assert_eq!(trim_leading("abc", 3), "");
        assert_eq!(trim_leading("abc", 200), "");
        assert_eq!(trim_leading("abc", 0), "abc");
        assert_eq!(trim_leading("उद्यम रजिस्ट्रेशन", 6), "रजिस्ट्रेशन");
    }

    #[test]
    fn test_recognized_text_skips_header() {
        let header = "x".repeat(200);
        let document = OcrDocument::from_text(&format!("{}\nACME", header));
        assert_eq!(recognized_text(&document, 200), "\nACME");
        assert_eq!(recognized_text(&document, 0), format!("{}\nACME", header));
        assert_eq!(recognized_text(&OcrDocument::from_text("short"), 200), "");
    }

    #[test]
    fn test_text_box_rect() {
        let text_box = TextBox {
            bbox: [10.0, 20.0, 50.0, 20.0, 50.0, 35.0, 10.0, 35.0],
            text: "ACME".to_string(),
            confidence: 0.8,
        };
        assert_eq!(text_box.rect(), (10.0, 20.0, 50.0, 35.0));
        assert_eq!(text_box.height(), 15.0);
    }

    #[test]
    fn test_load_page_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = dir.path().join("page.png");
        DynamicImage::new_luma8(4, 2).save(&png).unwrap();
        let page = load_page_image(&png).unwrap();
        assert_eq!((page.width(), page.height()), (4, 2));

        let text = dir.path().join("page.jpg");
        std::fs::write(&text, "not an image").unwrap();
        let err = load_page_image(&text).unwrap_err();
        assert!(matches!(err, crate::error::UdyamError::Image(_)));
    }
}
