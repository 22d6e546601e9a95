use rayon::prelude::*;
use tally_core::{ConfigError, ExtractionConfig, Record};
use tracing::debug;

use crate::assemble::assemble;
use crate::cluster::cluster_lines;
use crate::detect::{CandidateSet, Detector};
use crate::disambiguate::resolve;
use crate::locale::detect_locale;
use crate::normalize::normalize;
use crate::types::{Line, TextBox};

/// Turns one document's OCR boxes into a [`Record`].
///
/// Holds only the validated configuration and compiled matchers, so a single
/// instance can be shared by any number of worker threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    detector: Detector,
}

impl Extractor {
    /// Validate `config` and compile its tables. Fails before any document
    /// is processed if a threshold or table is malformed.
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigError> {
        Ok(Self { detector: Detector::new(config)? })
    }

    pub fn config(&self) -> &ExtractionConfig {
        self.detector.config()
    }

    /// Normalized boxes clustered into lines.
    pub fn lines(&self, boxes: &[TextBox]) -> Vec<Line> {
        let config = self.config();
        let clean = normalize(boxes, config.confidence_floor);
        cluster_lines(&clean, config.line_overlap_ratio)
    }

    /// Every scored candidate, before disambiguation.
    pub fn candidates(&self, boxes: &[TextBox]) -> CandidateSet {
        let lines = self.lines(boxes);
        let locale = detect_locale(&lines, &self.config().locales);
        self.detector.detect(&lines, locale)
    }

    /// Run the full pipeline. Never fails: fields without usable evidence
    /// are null.
    pub fn extract(&self, document_id: &str, boxes: &[TextBox]) -> Record {
        let lines = self.lines(boxes);
        if lines.is_empty() {
            debug!(document_id, "no usable text boxes");
            return Record::empty(document_id);
        }
        let locale = detect_locale(&lines, &self.config().locales);
        debug!(
            document_id,
            lines = lines.len(),
            locale = locale.map(|l| l.name.as_str()),
            "extracting fields"
        );
        let candidates = self.detector.detect(&lines, locale);
        assemble(document_id, resolve(&candidates))
    }

    /// Extract many documents in parallel. Output order matches input order.
    pub fn extract_batch<S>(&self, documents: &[(S, Vec<TextBox>)]) -> Vec<Record>
    where
        S: AsRef<str> + Sync,
    {
        documents
            .par_iter()
            .map(|(id, boxes)| self.extract(id.as_ref(), boxes))
            .collect()
    }
}
