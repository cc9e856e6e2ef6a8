//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{LayoutGrouper, OcrDocument, OcrPage, TextBox, TextSource};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// Loading the models is the expensive step: build the engine once per
/// process and share it by reference.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    grouper: LayoutGrouper,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path, models: &ModelConfig, config: &OcrConfig) -> crate::Result<Self> {
        for name in models.files() {
            if !model_dir.join(name).exists() {
                return Err(OcrError::ModelLoad(format!(
                    "{} not found in {}",
                    name,
                    model_dir.display()
                ))
                .into());
            }
        }

        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine,
            grouper: LayoutGrouper::from_config(config),
            keep_unk: config.keep_unk,
        })
    }

    /// Recognize one page image.
    pub fn process_page(&self, number: u32, image: &DynamicImage) -> Result<OcrPage, OcrError> {
        let (width, height) = image.dimensions();
        debug!("Recognizing page {}: {}x{}", number, width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        Ok(OcrPage {
            number,
            size: (width, height),
            blocks: self.grouper.group(boxes),
        })
    }
}

impl TextSource for PureOcrEngine {
    fn recognize(&self, pages: &[DynamicImage]) -> Result<OcrDocument, OcrError> {
        if pages.is_empty() {
            return Err(OcrError::NoPages);
        }

        let start = Instant::now();
        let pages = pages
            .iter()
            .enumerate()
            .map(|(i, image)| self.process_page(i as u32 + 1, image))
            .collect::<Result<Vec<_>, _>>()?;

        let document = OcrDocument {
            pages,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "OCR complete: {} pages, {} words in {}ms",
            document.pages.len(),
            document.word_count(),
            document.processing_time_ms
        );

        Ok(document)
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UdyamError;

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("det.onnx"), b"").unwrap();

        let err = PureOcrEngine::from_dir(dir.path(), &ModelConfig::default(), &OcrConfig::default())
            .err()
            .unwrap();
        match err {
            UdyamError::Ocr(OcrError::ModelLoad(message)) => assert!(message.contains("latin_rec.onnx")),
            other => panic!("expected a model load error, got {:?}", other),
        }
    }
}
