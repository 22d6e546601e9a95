use tally_core::{FieldScores, Record};
use tracing::debug;

use crate::disambiguate::Selections;
use crate::types::{FieldCandidate, FieldValue};

/// Build the record for one document. Fields are independent: a missing
/// total never hides a detected currency, and so on.
pub fn assemble(source_document_id: &str, selections: Selections) -> Record {
    let mut scores = FieldScores::default();

    let date = take(selections.date, &mut scores.date, |v| match v {
        FieldValue::Date(d) => Some(d),
        _ => None,
    });
    let vendor = take(selections.vendor, &mut scores.vendor, |v| match v {
        FieldValue::Text(t) => Some(t),
        _ => None,
    });
    let total = take(selections.total, &mut scores.total, |v| match v {
        FieldValue::Amount(a) => Some(a),
        _ => None,
    });
    let currency = take(selections.currency, &mut scores.currency, |v| match v {
        FieldValue::Currency(c) => Some(c),
        _ => None,
    });
    let location = take(selections.location, &mut scores.location, |v| match v {
        FieldValue::Text(t) => Some(t),
        _ => None,
    });

    Record {
        source_document_id: source_document_id.to_string(),
        date,
        vendor,
        total,
        currency,
        location,
        scores,
    }
}

/// Unwrap a selected value of the expected shape, recording its score.
fn take<T>(
    candidate: Option<FieldCandidate>,
    score: &mut Option<f32>,
    extract: impl FnOnce(FieldValue) -> Option<T>,
) -> Option<T> {
    let candidate = candidate?;
    let (kind, candidate_score) = (candidate.kind, candidate.score);
    match extract(candidate.value) {
        Some(value) => {
            *score = Some(candidate_score);
            Some(value)
        }
        None => {
            debug!(field = %kind, "candidate value has the wrong type; field left empty");
            None
        }
    }
}
