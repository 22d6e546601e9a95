use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Score (0.0–1.0) of the candidate each field was resolved from.
/// `None` where the field is null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldScores {
    pub date: Option<f32>,
    pub vendor: Option<f32>,
    pub total: Option<f32>,
    pub currency: Option<f32>,
    pub location: Option<f32>,
}

impl FieldScores {
    fn all(&self) -> [Option<f32>; 5] {
        [self.date, self.vendor, self.total, self.currency, self.location]
    }
}

/// The structured row produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub source_document_id: String,
    pub date: Option<NaiveDate>,
    pub vendor: Option<String>,
    pub total: Option<Decimal>,
    /// ISO 4217 code.
    pub currency: Option<String>,
    pub location: Option<String>,
    pub scores: FieldScores,
}

impl Record {
    /// A record with every field null.
    pub fn empty(source_document_id: impl Into<String>) -> Self {
        Self {
            source_document_id: source_document_id.into(),
            date: None,
            vendor: None,
            total: None,
            currency: None,
            location: None,
            scores: FieldScores::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.all().iter().all(Option::is_none)
    }

    /// Whether an operator should look at this record: a field is missing or
    /// was resolved with a score below `threshold`.
    pub fn needs_review(&self, threshold: f32) -> bool {
        self.scores
            .all()
            .iter()
            .any(|s| s.map_or(true, |score| score < threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Record {
        Record {
            source_document_id: "r1.jpg".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            vendor: Some("ACME".into()),
            total: Some(Decimal::new(4250, 2)),
            currency: Some("USD".into()),
            location: Some("1 Main St".into()),
            scores: FieldScores {
                date: Some(0.9),
                vendor: Some(0.9),
                total: Some(0.9),
                currency: Some(1.0),
                location: Some(0.8),
            },
        }
    }

    #[test]
    fn empty_record_has_no_fields() {
        let r = Record::empty("scan-001");
        assert_eq!(r.source_document_id, "scan-001");
        assert!(r.is_empty());
        assert!(r.needs_review(0.7));
    }

    #[test]
    fn needs_review_threshold() {
        let r = complete();
        assert!(!r.needs_review(0.7));
        assert!(r.needs_review(0.85));
    }

    #[test]
    fn missing_field_needs_review() {
        let mut r = complete();
        r.location = None;
        r.scores.location = None;
        assert!(r.needs_review(0.1));
    }

    #[test]
    fn serializes_nulls_and_decimal() {
        let mut r = Record::empty("a");
        r.total = Some(Decimal::new(4250, 2));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["total"], "42.50");
        assert!(json["vendor"].is_null());
        assert!(json["date"].is_null());
    }
}
