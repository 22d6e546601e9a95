use std::collections::BTreeMap;

use crate::types::{FieldCandidate, FieldKind, FieldValue, Line};

use super::sort_by_score;

/// Symbol and code lookup, built from the configured tables.
#[derive(Debug, Clone)]
pub struct CurrencyTable {
    /// (symbol, ISO code); longest symbol first.
    symbols: Vec<(String, String)>,
    /// Uppercased word → ISO code.
    codes: BTreeMap<String, String>,
}

#[derive(Debug)]
struct Tally {
    count: usize,
    first_line: usize,
    first_raw: String,
}

impl CurrencyTable {
    pub fn new(symbols: &BTreeMap<String, String>, codes: &BTreeMap<String, String>) -> Self {
        let mut symbols: Vec<(String, String)> =
            symbols.iter().filter(|(s, _)| !s.is_empty()).map(|(s, c)| (s.clone(), c.clone())).collect();
        symbols.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        let codes = codes.iter().map(|(w, c)| (w.to_uppercase(), c.clone())).collect();
        Self { symbols, codes }
    }

    /// (raw token, ISO code) for every currency mention in `text`, symbols
    /// first. At each position the longest symbol wins and the scan resumes
    /// after it, so `HK$` never also counts as `$`.
    fn mentions_in<'t>(&'t self, text: &'t str) -> Vec<(&'t str, &'t str)> {
        let mut found = Vec::new();
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            match self.symbols.iter().find(|(sym, _)| rest.starts_with(sym.as_str())) {
                Some((sym, code)) => {
                    found.push((&rest[..sym.len()], code.as_str()));
                    rest = &rest[sym.len()..];
                }
                None => rest = &rest[c.len_utf8()..],
            }
        }
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .filter_map(|w| self.codes.get(&w.to_uppercase()).map(|code| (w, code.as_str())));
        found.extend(words);
        found
    }

    pub fn mentions(&self, text: &str) -> bool {
        !self.mentions_in(text).is_empty()
    }

    /// One candidate per currency, scored by its share of all mentions.
    pub fn detect(&self, lines: &[Line]) -> Vec<FieldCandidate> {
        let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
        let mut total = 0usize;
        for line in lines {
            for (raw, code) in self.mentions_in(&line.text) {
                total += 1;
                tallies
                    .entry(code)
                    .and_modify(|t| t.count += 1)
                    .or_insert_with(|| Tally {
                        count: 1,
                        first_line: line.index,
                        first_raw: raw.to_string(),
                    });
            }
        }
        if total == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<FieldCandidate> = tallies
            .into_iter()
            .map(|(code, t)| {
                FieldCandidate::new(
                    FieldKind::Currency,
                    t.first_raw,
                    FieldValue::Currency(code.to_string()),
                    t.first_line,
                    t.count as f32 / total as f32,
                )
            })
            .collect();
        candidates.sort_by_key(|c| c.line_index);
        sort_by_score(&mut candidates);
        candidates
    }
}
