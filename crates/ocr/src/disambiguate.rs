use std::cmp::Ordering;

use tracing::trace;

use crate::detect::CandidateSet;
use crate::types::{FieldCandidate, FieldKind, TieBreak};

/// The winning candidate per field; `None` where nothing was found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    pub date: Option<FieldCandidate>,
    pub vendor: Option<FieldCandidate>,
    pub total: Option<FieldCandidate>,
    pub currency: Option<FieldCandidate>,
    pub location: Option<FieldCandidate>,
}

/// Highest score wins. Equal scores fall to the kind's tie-break: the top
/// line for everything except totals, which take the bottom line.
pub fn select(kind: FieldKind, candidates: &[FieldCandidate]) -> Option<FieldCandidate> {
    let tie_break = kind.tie_break();
    candidates
        .iter()
        .filter(|c| c.kind == kind)
        .reduce(|best, c| {
            let wins = match c.score.total_cmp(&best.score) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => match tie_break {
                    TieBreak::TopMost => c.line_index < best.line_index,
                    TieBreak::BottomMost => c.line_index > best.line_index,
                },
            };
            if wins {
                c
            } else {
                best
            }
        })
        .cloned()
}

pub fn resolve(candidates: &CandidateSet) -> Selections {
    let pick = |kind: FieldKind| {
        let chosen = select(kind, candidates.get(kind));
        trace!(field = %kind, raw = ?chosen.as_ref().map(|c| c.raw_text.as_str()), "selected");
        chosen
    };
    Selections {
        date: pick(FieldKind::Date),
        vendor: pick(FieldKind::Vendor),
        total: pick(FieldKind::Total),
        currency: pick(FieldKind::Currency),
        location: pick(FieldKind::Location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use rust_decimal::Decimal;

    fn amount(line: usize, cents: i64, score: f32) -> FieldCandidate {
        FieldCandidate::new(
            FieldKind::Total,
            "x",
            FieldValue::Amount(Decimal::new(cents, 2)),
            line,
            score,
        )
    }

    fn vendor(line: usize, name: &str, score: f32) -> FieldCandidate {
        FieldCandidate::new(FieldKind::Vendor, name, FieldValue::Text(name.into()), line, score)
    }

    #[test]
    fn empty_list_is_none() {
        assert_eq!(select(FieldKind::Date, &[]), None);
    }

    #[test]
    fn highest_score_wins() {
        let c = [vendor(3, "B", 0.9), vendor(0, "A", 0.5)];
        assert_eq!(select(FieldKind::Vendor, &c).unwrap().line_index, 3);
    }

    #[test]
    fn total_tie_prefers_lower_line() {
        let c = [amount(2, 1000, 0.8), amount(7, 1000, 0.8), amount(4, 1000, 0.8)];
        assert_eq!(select(FieldKind::Total, &c).unwrap().line_index, 7);
    }

    #[test]
    fn vendor_tie_prefers_upper_line() {
        let c = [vendor(4, "LATER", 0.8), vendor(1, "EARLY", 0.8), vendor(2, "MID", 0.8)];
        assert_eq!(select(FieldKind::Vendor, &c).unwrap().raw_text, "EARLY");
    }

    #[test]
    fn ignores_other_kinds() {
        let c = [amount(0, 100, 1.0)];
        assert_eq!(select(FieldKind::Vendor, &c), None);
    }

    #[test]
    fn resolve_leaves_missing_fields_empty() {
        let set = CandidateSet { vendor: vec![vendor(0, "SHOP", 0.7)], ..Default::default() };
        let s = resolve(&set);
        assert_eq!(s.vendor.unwrap().raw_text, "SHOP");
        assert!(s.date.is_none() && s.total.is_none() && s.currency.is_none() && s.location.is_none());
    }
}
