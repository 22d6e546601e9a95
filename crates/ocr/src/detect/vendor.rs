use tally_core::ExtractionConfig;

use super::total::amounts;
use super::{sort_by_score, Keywords};
use crate::score;
use crate::types::{FieldCandidate, FieldKind, FieldValue, Line};

const SUFFIX_BOOST: f32 = 0.15;

/// Printed in large type near the top, and not a header like "RECEIPT"
/// or a priced line such as an item, a total or a payment.
fn eligible(line: &Line, keywords: &Keywords) -> bool {
    let text = line.text.trim();
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    if letters == 0 || text.chars().count() < 3 || digits > letters {
        return false;
    }
    let k = keywords;
    ![&k.vendor_skip, &k.total, &k.total_exclude, &k.tender].iter().any(|set| set.is_match(text))
        && amounts(text).is_empty()
}

pub(crate) fn detect(lines: &[Line], keywords: &Keywords, config: &ExtractionConfig) -> Vec<FieldCandidate> {
    let window = config.vendor_window;
    let pool: Vec<&Line> = lines
        .iter()
        .take(window)
        .filter(|l| eligible(l, keywords))
        .collect();

    let max_height = pool.iter().map(|l| l.height()).fold(0.0f32, f32::max);

    let mut candidates: Vec<FieldCandidate> = pool
        .into_iter()
        .map(|line| {
            let height = if max_height > 0.0 { line.height() / max_height } else { 0.0 };
            let position = score::from_top(line.index, window);
            let mut s = score::prominence(height, position, &config.weights);
            if keywords.vendor_suffixes.is_match(&line.text) {
                s += SUFFIX_BOOST;
            }
            let name = line.text.trim();
            FieldCandidate::new(FieldKind::Vendor, name, FieldValue::Text(name.to_string()), line.index, s)
        })
        .collect();

    sort_by_score(&mut candidates);
    candidates
}
