use std::str::FromStr;

use rust_decimal::Decimal;
use tally_core::ExtractionConfig;
use tracing::debug;

use super::{re, sort_by_score, CurrencyTable, Keywords, ParseFailure};
use crate::score;
use crate::types::{FieldCandidate, FieldKind, FieldValue, Line};

// Thousands-grouped amounts first so "1,234.56" is not read as "234.56".
re!(re_amount,
    r"(?:^|[^\d.,/])(\d{1,3}(?:[.,]\d{3})+[.,]\d{2}|\d+[.,]\d{2})");

const NEXT_LINE_KEYWORD: f32 = 0.7;
const CURRENCY_BOOST: f32 = 0.1;
const BOTTOM_LINE_BOOST: f32 = 0.1;

/// Parse `1,234.56`, `1.234,56` or `10,99`: the last separator is the
/// decimal point, any earlier ones group thousands.
pub fn parse_amount(raw: &str) -> Result<Decimal, ParseFailure> {
    let invalid = || ParseFailure::InvalidAmount { raw: raw.to_string() };
    let split = raw.rfind(['.', ',']).ok_or_else(invalid)?;
    let (int_part, frac_part) = (&raw[..split], &raw[split + 1..]);
    let int_digits: String = int_part.chars().filter(char::is_ascii_digit).collect();
    if int_digits.is_empty() || frac_part.is_empty() || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    Decimal::from_str(&format!("{int_digits}.{frac_part}")).map_err(|_| invalid())
}

/// Amounts written on a line, left to right. Percentages and fragments of
/// longer numbers (dates, codes) are skipped.
pub(super) fn amounts(text: &str) -> Vec<(String, Decimal)> {
    let mut out = Vec::new();
    for caps in re_amount().captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        let mut rest = text[m.end()..].chars();
        match rest.next() {
            Some(c) if c.is_ascii_digit() || c == '%' => continue,
            Some('.') | Some(',') if rest.next().is_some_and(|c| c.is_ascii_digit()) => continue,
            _ => {}
        }
        if text[m.end()..].trim_start().starts_with('%') {
            continue;
        }
        match parse_amount(m.as_str()) {
            Ok(value) => out.push((m.as_str().to_string(), value)),
            Err(e) => debug!("{e}"),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Evidence {
    /// Amount on the labeled line, or below a bare label.
    Keyword(f32),
    Unlabeled,
}

pub(crate) fn detect(
    lines: &[Line],
    keywords: &Keywords,
    currencies: &CurrencyTable,
    config: &ExtractionConfig,
) -> Vec<FieldCandidate> {
    let n = lines.len();
    let excluded = |l: &Line| keywords.total_exclude.is_match(&l.text);
    let tender = |l: &Line| keywords.tender.is_match(&l.text);
    let labeled = |l: &Line| keywords.total.is_match(&l.text);

    let mut found: Vec<(usize, String, Decimal, Evidence)> = Vec::new();
    let mut consumed = vec![false; n];
    let mut max_tendered: Option<Decimal> = None;

    for (i, line) in lines.iter().enumerate() {
        if excluded(line) {
            continue;
        }
        if tender(line) {
            for (_, value) in amounts(&line.text) {
                max_tendered = Some(max_tendered.map_or(value, |m| m.max(value)));
            }
            continue;
        }
        if !labeled(line) {
            continue;
        }
        let own = amounts(&line.text);
        if !own.is_empty() {
            found.extend(own.into_iter().map(|(raw, v)| (i, raw, v, Evidence::Keyword(1.0))));
            continue;
        }
        // Bare label: the amount is printed on a following line.
        for j in (i + 1..n).take(config.total_lookahead) {
            let next = &lines[j];
            if excluded(next) || tender(next) || labeled(next) {
                break;
            }
            let below = amounts(&next.text);
            if !below.is_empty() {
                consumed[j] = true;
                found.extend(
                    below
                        .into_iter()
                        .map(|(raw, v)| (j, raw, v, Evidence::Keyword(NEXT_LINE_KEYWORD))),
                );
                break;
            }
        }
    }

    // Unlabeled amounts near the bottom, never above what was tendered.
    let cap = max_tendered.map(|m| m + Decimal::new(1, 2));
    for (i, line) in lines.iter().enumerate().skip(n.saturating_sub(config.fallback_window)) {
        if consumed[i] || excluded(line) || tender(line) || labeled(line) {
            continue;
        }
        for (raw, value) in amounts(&line.text) {
            if cap.is_some_and(|c| value > c) {
                debug!(%value, "unlabeled amount above tendered cash");
                continue;
            }
            found.push((i, raw, value, Evidence::Unlabeled));
        }
    }

    let bottom_keyword_line = found
        .iter()
        .filter(|f| matches!(f.3, Evidence::Keyword(_)))
        .map(|f| f.0)
        .max();

    let mut candidates: Vec<FieldCandidate> = found
        .into_iter()
        .filter(|(_, _, value, _)| *value > Decimal::ZERO)
        .map(|(i, raw, value, evidence)| {
            let keyword = match evidence {
                Evidence::Keyword(k) => k,
                Evidence::Unlabeled => 0.0,
            };
            let mut s = score::context(keyword, score::from_bottom(i, n), &config.weights);
            if currencies.mentions(&lines[i].text) {
                s += CURRENCY_BOOST;
            }
            if Some(i) == bottom_keyword_line {
                s += BOTTOM_LINE_BOOST;
            }
            FieldCandidate::new(FieldKind::Total, raw, FieldValue::Amount(value), lines[i].index, s)
        })
        .collect();

    // Line order before the stable score sort keeps ties deterministic.
    candidates.sort_by_key(|c| c.line_index);
    sort_by_score(&mut candidates);
    candidates
}
