use thiserror::Error;

use crate::types::TextBox;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR output could not be decoded: {0}")]
    Decode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
}

impl From<serde_json::Error> for OcrError {
    fn from(e: serde_json::Error) -> Self {
        OcrError::Decode(e.to_string())
    }
}

/// Abstraction over a text detection + recognition engine.
/// Implementations accept raw image bytes and return every recognized
/// fragment with its confidence and polygon, in any order.
///
/// Implementations are shared between worker threads; an engine that cannot
/// serve concurrent calls should be pooled by the caller, one per worker.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<TextBox>, OcrError>;
}

/// Lets a pipeline borrow an engine owned elsewhere.
impl<T: OcrBackend + ?Sized> OcrBackend for &T {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<TextBox>, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set list of boxes, for exercising the extraction pipeline
/// without a recognition model.
pub struct MockRecognizer {
    pub boxes: Vec<TextBox>,
}

impl MockRecognizer {
    pub fn new(boxes: Vec<TextBox>) -> Self {
        Self { boxes }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<TextBox>, OcrError> {
        Ok(self.boxes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    #[test]
    fn mock_returns_preset_boxes() {
        let b = TextBox::new("STARBUCKS", 0.99, BoundingBox::from_rect(0.0, 0.0, 90.0, 20.0));
        let r = MockRecognizer::new(vec![b.clone()]);
        assert_eq!(r.recognize(b"fake image data").unwrap(), vec![b]);
    }

    #[test]
    fn mock_ignores_image_content() {
        let r = MockRecognizer::new(vec![]);
        assert!(r.recognize(b"anything").unwrap().is_empty());
        assert!(r.recognize(b"").unwrap().is_empty());
    }

    #[test]
    fn json_errors_become_decode_errors() {
        let err: OcrError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, OcrError::Decode(_)));
    }
}
