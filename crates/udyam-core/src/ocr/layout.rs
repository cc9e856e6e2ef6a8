//! Reading-order grouping of detected text boxes into lines and blocks.

use std::cmp::Ordering;

use tracing::trace;

use crate::models::config::OcrConfig;

use super::{OcrBlock, OcrLine, OcrWord, TextBox};

/// Groups text boxes of one page into blocks of lines of words.
///
/// Boxes are bucketed into rows of `row_height` pixels by their top edge and
/// read left to right inside a row. A row is a line. A vertical gap between
/// lines wider than `block_gap_factor` median line heights starts a new block.
#[derive(Debug, Clone)]
pub struct LayoutGrouper {
    row_height: f32,
    block_gap_factor: f32,
}

struct Row {
    top: f32,
    bottom: f32,
    boxes: Vec<TextBox>,
}

impl LayoutGrouper {
    pub fn new() -> Self {
        Self {
            row_height: 20.0,
            block_gap_factor: 1.5,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new()
            .with_row_height(config.row_height)
            .with_block_gap_factor(config.block_gap_factor)
    }

    pub fn with_row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height.max(1.0);
        self
    }

    pub fn with_block_gap_factor(mut self, factor: f32) -> Self {
        self.block_gap_factor = factor;
        self
    }

    fn row_of(&self, text_box: &TextBox) -> i64 {
        let (_, top, _, _) = text_box.rect();
        (top / self.row_height) as i64
    }

    /// Group boxes into blocks in reading order.
    pub fn group(&self, mut boxes: Vec<TextBox>) -> Vec<OcrBlock> {
        boxes.sort_by(|a, b| {
            self.row_of(a).cmp(&self.row_of(b)).then_with(|| {
                let (ax, _, _, _) = a.rect();
                let (bx, _, _, _) = b.rect();
                ax.partial_cmp(&bx).unwrap_or(Ordering::Equal)
            })
        });

        let mut rows: Vec<Row> = Vec::new();
        let mut current_row = None;
        for text_box in boxes {
            let row = self.row_of(&text_box);
            let (_, top, _, bottom) = text_box.rect();
            match rows.last_mut() {
                Some(last) if current_row == Some(row) => {
                    last.top = last.top.min(top);
                    last.bottom = last.bottom.max(bottom);
                    last.boxes.push(text_box);
                }
                _ => {
                    rows.push(Row {
                        top,
                        bottom,
                        boxes: vec![text_box],
                    });
                    current_row = Some(row);
                }
            }
        }

        let max_gap = self.block_gap_factor * median_height(&rows);
        trace!("Grouping {} rows, block gap threshold {:.1}px", rows.len(), max_gap);

        let mut blocks: Vec<OcrBlock> = Vec::new();
        let mut previous_bottom: Option<f32> = None;
        for row in rows {
            let starts_block = match previous_bottom {
                Some(bottom) => row.top - bottom > max_gap,
                None => true,
            };
            previous_bottom = Some(row.bottom);

            let line = OcrLine {
                words: row.boxes.iter().flat_map(split_words).collect(),
            };
            if line.words.is_empty() {
                continue;
            }

            match blocks.last_mut() {
                Some(block) if !starts_block => block.lines.push(line),
                _ => blocks.push(OcrBlock { lines: vec![line] }),
            }
        }

        blocks
    }
}

impl Default for LayoutGrouper {
    fn default() -> Self {
        Self::new()
    }
}

fn split_words(text_box: &TextBox) -> impl Iterator<Item = OcrWord> + '_ {
    text_box.text.split_whitespace().map(|value| OcrWord {
        value: value.to_string(),
        confidence: text_box.confidence,
    })
}

fn median_height(rows: &[Row]) -> f32 {
    let mut heights: Vec<f32> = rows.iter().map(|row| row.bottom - row.top).collect();
    if heights.is_empty() {
        return 0.0;
    }
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    heights[heights.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrDocument;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        let (w, h) = (80.0, 12.0);
        TextBox {
            bbox: [x, y, x + w, y, x + w, y + h, x, y + h],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    fn texts(blocks: &[OcrBlock]) -> Vec<Vec<String>> {
        blocks
            .iter()
            .map(|block| {
                block
                    .lines
                    .iter()
                    .map(|line| {
                        line.words
                            .iter()
                            .map(|w| w.value.as_str())
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_reading_order_within_row() {
        let blocks = LayoutGrouper::new().group(vec![
            text_box(300.0, 102.0, "ACME TRADERS"),
            text_box(10.0, 100.0, "NAME OF ENTERPRISE"),
        ]);
        assert_eq!(texts(&blocks), vec![vec!["NAME OF ENTERPRISE ACME TRADERS"]]);
    }

    #[test]
    fn test_large_gap_starts_block() {
        let blocks = LayoutGrouper::new().group(vec![
            text_box(10.0, 100.0, "first"),
            text_box(10.0, 120.0, "second"),
            text_box(10.0, 300.0, "third"),
        ]);
        assert_eq!(texts(&blocks), vec![vec!["first", "second"], vec!["third"]]);
    }

    #[test]
    fn test_blank_boxes_are_dropped() {
        let blocks = LayoutGrouper::new().group(vec![text_box(10.0, 10.0, "   "), text_box(10.0, 40.0, "kept")]);
        assert_eq!(texts(&blocks), vec![vec!["kept"]]);
    }

    #[test]
    fn test_words_flatten_in_order() {
        let blocks = LayoutGrouper::new().group(vec![
            text_box(10.0, 60.0, "MICRO"),
            text_box(10.0, 20.0, "UDYAM-MH-26-0012345"),
        ]);
        let document = OcrDocument {
            pages: vec![crate::ocr::OcrPage {
                number: 1,
                size: (600, 800),
                blocks,
            }],
            processing_time_ms: 0,
        };
        assert_eq!(document.raw_text(), "UDYAM-MH-26-0012345\nMICRO");
    }

    #[test]
    fn test_empty_input() {
        assert!(LayoutGrouper::new().group(Vec::new()).is_empty());
    }
}
