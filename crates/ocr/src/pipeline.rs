use std::path::Path;

use tally_core::{ConfigError, ExtractionConfig, Record};
use tracing::debug;

use crate::extract::Extractor;
use crate::recognizer::{OcrBackend, OcrError};

/// Orchestrates: recognize → normalize → cluster → detect → select → assemble.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    extractor: Extractor,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, config: ExtractionConfig) -> Result<Self, ConfigError> {
        Ok(Self { recognizer, extractor: Extractor::new(config)? })
    }

    pub fn with_extractor(recognizer: R, extractor: Extractor) -> Self {
        Self { recognizer, extractor }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Recognize one image and extract its record. Only the OCR engine can
    /// fail here; extraction itself always yields a record.
    pub fn scan(&self, document_id: &str, image_bytes: &[u8]) -> Result<Record, OcrError> {
        let boxes = self.recognizer.recognize(image_bytes)?;
        debug!(document_id, boxes = boxes.len(), "recognized");
        Ok(self.extractor.extract(document_id, &boxes))
    }
}

/// Identifier for a document read from `path`: the file name with its last
/// extension removed, so `scan-07.jpg.json` becomes `scan-07.jpg`.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockRecognizer;
    use crate::types::{BoundingBox, TextBox};
    use rust_decimal::Decimal;

    struct FailingRecognizer;

    impl OcrBackend for FailingRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<TextBox>, OcrError> {
            Err(OcrError::Engine("model not loaded".into()))
        }
    }

    fn receipt() -> Vec<TextBox> {
        vec![
            TextBox::new("CORNER SHOP", 0.97, BoundingBox::from_rect(0.0, 0.0, 200.0, 40.0)),
            TextBox::new("TOTAL 12.30 EUR", 0.93, BoundingBox::from_rect(0.0, 200.0, 200.0, 20.0)),
        ]
    }

    #[test]
    fn scan_runs_full_extraction() {
        let pipeline =
            ReceiptPipeline::new(MockRecognizer::new(receipt()), ExtractionConfig::default()).unwrap();
        let record = pipeline.scan("shop.jpg", b"\x89PNG").unwrap();
        assert_eq!(record.source_document_id, "shop.jpg");
        assert_eq!(record.vendor.as_deref(), Some("CORNER SHOP"));
        assert_eq!(record.total, Some(Decimal::new(1230, 2)));
        assert_eq!(record.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn pipeline_can_borrow_engine() {
        let engine = MockRecognizer::new(receipt());
        let pipeline = ReceiptPipeline::new(&engine, ExtractionConfig::default()).unwrap();
        assert_eq!(pipeline.scan("a", b"").unwrap().vendor.as_deref(), Some("CORNER SHOP"));
        assert_eq!(engine.boxes.len(), 2);
    }

    #[test]
    fn engine_failure_propagates() {
        let pipeline = ReceiptPipeline::new(FailingRecognizer, ExtractionConfig::default()).unwrap();
        assert!(matches!(pipeline.scan("x", b""), Err(OcrError::Engine(_))));
    }

    #[test]
    fn empty_recognition_is_null_record() {
        let pipeline =
            ReceiptPipeline::new(MockRecognizer::new(vec![]), ExtractionConfig::default()).unwrap();
        assert!(pipeline.scan("blank", b"").unwrap().is_empty());
    }

    #[test]
    fn bad_config_rejected() {
        let config = ExtractionConfig { review_threshold: 1.5, ..Default::default() };
        assert!(ReceiptPipeline::new(MockRecognizer::new(vec![]), config).is_err());
    }

    #[test]
    fn document_id_strips_last_extension() {
        assert_eq!(document_id(Path::new("/tmp/in/scan-07.jpg.json")), "scan-07.jpg");
        assert_eq!(document_id(Path::new("receipt.json")), "receipt");
        assert_eq!(document_id(Path::new("noext")), "noext");
    }
}
