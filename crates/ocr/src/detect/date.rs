use chrono::NaiveDate;
use regex::{Captures, Regex};
use tally_core::ScoringWeights;
use tracing::debug;

use super::{re, sort_by_score, Keywords, ParseFailure};
use crate::score;
use crate::types::{FieldCandidate, FieldKind, FieldValue, Line};

re!(re_date_iso,
    r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b");
re!(re_date_month_first,
    r"(?i)\b(january|february|march|april|june|july|august|september|october|november|december|jan|feb|mar|apr|may|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s*(\d{1,2})(?:st|nd|rd|th)?\b[\s.,']*(\d{4}|\d{2})\b");
re!(re_date_day_first,
    r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?[\s\-/.]*(january|february|march|april|june|july|august|september|october|november|december|jan|feb|mar|apr|may|jun|jul|aug|sept|sep|oct|nov|dec)\.?[\s\-/.,']*(\d{4}|\d{2})\b");
re!(re_date_numeric,
    r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|'?\d{2})\b");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    YearMonthDay,
    MonthNameDayYear,
    DayMonthNameYear,
    /// Day/month order decided by the values, then by locale.
    Numeric,
}

/// One recognized date grammar and how much a match of it is trusted.
#[derive(Debug, Clone, Copy)]
pub struct DateGrammar {
    pub name: &'static str,
    /// Specificity (0.0–1.0) with a four-digit year.
    pub specificity: f32,
    /// Specificity when the year is written with two digits.
    pub short_year_specificity: f32,
    pattern: fn() -> &'static Regex,
    layout: Layout,
}

/// Most specific first.
pub const DATE_GRAMMARS: [DateGrammar; 4] = [
    DateGrammar {
        name: "iso",
        specificity: 1.0,
        short_year_specificity: 1.0,
        pattern: re_date_iso,
        layout: Layout::YearMonthDay,
    },
    DateGrammar {
        name: "month_name_day_year",
        specificity: 0.9,
        short_year_specificity: 0.6,
        pattern: re_date_month_first,
        layout: Layout::MonthNameDayYear,
    },
    DateGrammar {
        name: "day_month_name_year",
        specificity: 0.9,
        short_year_specificity: 0.6,
        pattern: re_date_day_first,
        layout: Layout::DayMonthNameYear,
    },
    DateGrammar {
        name: "numeric",
        specificity: 0.8,
        short_year_specificity: 0.5,
        pattern: re_date_numeric,
        layout: Layout::Numeric,
    },
];

impl DateGrammar {
    /// Parse one match. `Ok(None)` if the capture groups are unusable.
    fn parse(&self, caps: &Captures, day_first: bool) -> Result<(NaiveDate, f32), ParseFailure> {
        let raw = caps.get(0).map_or("", |m| m.as_str());
        let invalid = || ParseFailure::InvalidDate { raw: raw.to_string() };
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).ok_or_else(invalid);
        let number = |i: usize| -> Result<u32, ParseFailure> {
            group(i)?.trim_start_matches('\'').parse().map_err(|_| invalid())
        };

        let (year_idx, year, month, day) = match self.layout {
            Layout::YearMonthDay => (1, number(1)?, number(2)?, number(3)?),
            Layout::MonthNameDayYear => {
                (3, number(3)?, month_number(group(1)?).ok_or_else(invalid)?, number(2)?)
            }
            Layout::DayMonthNameYear => {
                (3, number(3)?, month_number(group(2)?).ok_or_else(invalid)?, number(1)?)
            }
            Layout::Numeric => {
                let (a, b) = (number(1)?, number(2)?);
                let (month, day) = if a > 12 {
                    (b, a)
                } else if b > 12 || !day_first {
                    (a, b)
                } else {
                    (b, a)
                };
                (3, number(3)?, month, day)
            }
        };

        let short_year = group(year_idx)?.trim_start_matches('\'').len() <= 2;
        let year = if short_year { 2000 + year } else { year };
        let specificity = if short_year { self.short_year_specificity } else { self.specificity };

        let year = i32::try_from(year).map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        Ok((date, specificity))
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().get(..3)? {
        "jan" => 1, "feb" => 2, "mar" => 3, "apr" => 4, "may" => 5, "jun" => 6,
        "jul" => 7, "aug" => 8, "sep" => 9, "oct" => 10, "nov" => 11, "dec" => 12,
        _ => return None,
    };
    Some(month)
}

struct DateMatch {
    start: usize,
    end: usize,
    raw: String,
    date: NaiveDate,
    specificity: f32,
}

/// Every non-overlapping date in `text`. Where grammars overlap the most
/// specific reading wins. Impossible dates are logged and skipped.
fn find_dates(text: &str, day_first: bool) -> Vec<DateMatch> {
    let mut found: Vec<DateMatch> = Vec::new();
    for grammar in &DATE_GRAMMARS {
        for caps in (grammar.pattern)().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            match grammar.parse(&caps, day_first) {
                Ok((date, specificity)) => found.push(DateMatch {
                    start: whole.start(),
                    end: whole.end(),
                    raw: whole.as_str().to_string(),
                    date,
                    specificity,
                }),
                Err(e) => debug!(grammar = grammar.name, "{e}"),
            }
        }
    }

    found.sort_by(|a, b| b.specificity.total_cmp(&a.specificity).then(a.start.cmp(&b.start)));
    let mut accepted: Vec<DateMatch> = Vec::new();
    for m in found {
        if accepted.iter().all(|a| m.end <= a.start || m.start >= a.end) {
            accepted.push(m);
        }
    }
    accepted.sort_by_key(|m| m.start);
    accepted
}

/// The most specific date written in `text`, if any.
pub fn parse_date_in(text: &str, day_first: bool) -> Option<NaiveDate> {
    find_dates(text, day_first)
        .into_iter()
        .max_by(|a, b| a.specificity.total_cmp(&b.specificity).then(b.start.cmp(&a.start)))
        .map(|m| m.date)
}

/// Whether any date grammar matches, valid or not.
pub(crate) fn mentions_date(text: &str) -> bool {
    DATE_GRAMMARS.iter().any(|g| (g.pattern)().is_match(text))
}

pub(crate) fn detect(
    lines: &[Line],
    keywords: &Keywords,
    weights: &ScoringWeights,
    day_first: bool,
) -> Vec<FieldCandidate> {
    let n = lines.len();
    let mut candidates = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let keyword = if keywords.date.is_match(&line.text) {
            1.0
        } else if i > 0 && keywords.date.is_match(&lines[i - 1].text) {
            0.5
        } else {
            0.0
        };
        let context = score::context(keyword, score::from_top(i, n), weights);

        for m in find_dates(&line.text, day_first) {
            candidates.push(FieldCandidate::new(
                FieldKind::Date,
                m.raw,
                FieldValue::Date(m.date),
                line.index,
                (m.specificity + context) / 2.0,
            ));
        }
    }

    sort_by_score(&mut candidates);
    candidates
}
