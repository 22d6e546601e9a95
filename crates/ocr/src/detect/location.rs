use tally_core::ScoringWeights;

use super::date::mentions_date;
use super::{re, sort_by_score, Keywords};
use crate::score;
use crate::types::{FieldCandidate, FieldKind, FieldValue, Line};

re!(re_zip, r"\b\d{5}(?:-\d{4})?\b");
re!(re_uk_postcode, r"\b[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}\b");
re!(re_ca_postcode, r"\b[A-Z]\d[A-Z]\s?\d[A-Z]\d\b");
re!(re_state_zip, r"\b[A-Z]{2}\s+\d{5}\b");

const ADDRESS_WORD: f32 = 0.5;
const POSTAL_CODE: f32 = 0.6;
const STATE_ZIP: f32 = 0.3;
const MERGE_BONUS: f32 = 0.2;

/// How strongly a line reads like part of an address. 0.0 = not at all.
fn evidence(text: &str, keywords: &Keywords) -> f32 {
    let mut e = 0.0;
    if keywords.address.is_match(text) {
        e += ADDRESS_WORD;
    }
    if re_zip().is_match(text) || re_uk_postcode().is_match(text) || re_ca_postcode().is_match(text) {
        e += POSTAL_CODE;
    }
    if re_state_zip().is_match(text) {
        e += STATE_ZIP;
    }
    e
}

struct Block {
    first: usize,
    text: String,
    evidence: f32,
}

pub(crate) fn detect(lines: &[Line], keywords: &Keywords, weights: &ScoringWeights) -> Vec<FieldCandidate> {
    let n = lines.len();
    let scored: Vec<(usize, f32)> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| !mentions_date(&l.text) && !keywords.location_penalty.is_match(&l.text))
        .map(|(i, l)| (i, evidence(&l.text, keywords)))
        .filter(|&(_, e)| e > 0.0)
        .collect();

    // Street line followed by a city/zip line reads as one address.
    let mut blocks: Vec<Block> = Vec::new();
    let mut k = 0;
    while k < scored.len() {
        let (i, e) = scored[k];
        match scored.get(k + 1) {
            Some(&(j, e2)) if j == i + 1 => {
                blocks.push(Block {
                    first: i,
                    text: format!("{} {}", lines[i].text.trim(), lines[j].text.trim()),
                    evidence: e + e2 + MERGE_BONUS,
                });
                k += 2;
            }
            _ => {
                blocks.push(Block { first: i, text: lines[i].text.trim().to_string(), evidence: e });
                k += 1;
            }
        }
    }

    let labeled = |i: usize| {
        keywords.address_label.is_match(&lines[i].text)
            || (i > 0 && keywords.address_label.is_match(&lines[i - 1].text))
    };

    let mut candidates: Vec<FieldCandidate> = blocks
        .into_iter()
        .map(|b| {
            let label = if labeled(b.first) { 1.0 } else { 0.0 };
            let context = score::context(label, score::from_top(b.first, n), weights);
            let s = (score::clamp(b.evidence) + context) / 2.0;
            FieldCandidate::new(
                FieldKind::Location,
                b.text.clone(),
                FieldValue::Text(b.text),
                lines[b.first].index,
                s,
            )
        })
        .collect();

    sort_by_score(&mut candidates);
    candidates
}
