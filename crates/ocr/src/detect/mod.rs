//! Field candidate detection.
//!
//! Each field kind has an independent detector over the clustered lines.
//! Detectors never fail: a token that looks right but does not parse is
//! logged and dropped, and a kind with no evidence yields an empty list.

mod currency;
mod date;
mod location;
mod total;
mod vendor;

use tally_core::{ConfigError, ExtractionConfig, LocaleProfile};
use thiserror::Error;

use crate::matcher::KeywordSet;
use crate::types::{FieldCandidate, FieldKind, Line};

pub use currency::CurrencyTable;
pub use date::{parse_date_in, DateGrammar, DATE_GRAMMARS};
pub use total::parse_amount;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}
pub(crate) use re;

/// A token matched a field pattern but is not a valid value.
#[derive(Debug, Error, PartialEq)]
pub enum ParseFailure {
    #[error("impossible calendar date '{raw}'")]
    InvalidDate { raw: String },
    #[error("unparseable amount '{raw}'")]
    InvalidAmount { raw: String },
}

/// Candidates per field kind, each list sorted by score descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    pub date: Vec<FieldCandidate>,
    pub vendor: Vec<FieldCandidate>,
    pub total: Vec<FieldCandidate>,
    pub currency: Vec<FieldCandidate>,
    pub location: Vec<FieldCandidate>,
}

impl CandidateSet {
    pub fn get(&self, kind: FieldKind) -> &[FieldCandidate] {
        match kind {
            FieldKind::Date => &self.date,
            FieldKind::Vendor => &self.vendor,
            FieldKind::Total => &self.total,
            FieldKind::Currency => &self.currency,
            FieldKind::Location => &self.location,
        }
    }
}

/// Keyword tables compiled once per extractor.
#[derive(Debug, Clone)]
pub(crate) struct Keywords {
    pub date: KeywordSet,
    pub total: KeywordSet,
    pub total_exclude: KeywordSet,
    pub tender: KeywordSet,
    pub vendor_skip: KeywordSet,
    pub vendor_suffixes: KeywordSet,
    pub address: KeywordSet,
    pub address_label: KeywordSet,
    pub location_penalty: KeywordSet,
}

/// Runs every field detector with one compiled configuration.
#[derive(Debug, Clone)]
pub struct Detector {
    config: ExtractionConfig,
    keywords: Keywords,
    currencies: CurrencyTable,
}

impl Detector {
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let k = &config.keywords;
        let keywords = Keywords {
            date: KeywordSet::new("keywords.date", &k.date)?,
            total: KeywordSet::new("keywords.total", &k.total)?,
            total_exclude: KeywordSet::new("keywords.total_exclude", &k.total_exclude)?,
            tender: KeywordSet::new("keywords.tender", &k.tender)?,
            vendor_skip: KeywordSet::new("keywords.vendor_skip", &k.vendor_skip)?,
            vendor_suffixes: KeywordSet::new("keywords.vendor_suffixes", &k.vendor_suffixes)?,
            address: KeywordSet::new("keywords.address", &k.address)?,
            address_label: KeywordSet::new("keywords.address_label", &k.address_label)?,
            location_penalty: KeywordSet::new("keywords.location_penalty", &k.location_penalty)?,
        };
        let currencies = CurrencyTable::new(&config.currency_symbols, &config.currency_codes);
        Ok(Self { config, keywords, currencies })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn detect(&self, lines: &[Line], locale: Option<&LocaleProfile>) -> CandidateSet {
        let day_first = locale.is_some_and(|l| l.day_first);
        CandidateSet {
            date: date::detect(lines, &self.keywords, &self.config.weights, day_first),
            vendor: vendor::detect(lines, &self.keywords, &self.config),
            total: total::detect(lines, &self.keywords, &self.currencies, &self.config),
            currency: self.currencies.detect(lines),
            location: location::detect(lines, &self.keywords, &self.config.weights),
        }
    }
}

/// Stable sort by score, highest first; equal scores keep line order.
pub(crate) fn sort_by_score(candidates: &mut [FieldCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::Line;

    pub fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| Line { index, boxes: vec![], text: t.to_string() })
            .collect()
    }
}
