use regex::Regex;
use tally_core::ConfigError;

/// Case-insensitive, whole-word matcher over a configured keyword list.
/// Multi-word keywords tolerate any run of whitespace between words.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    re: Option<Regex>,
}

impl KeywordSet {
    pub fn new(table: &'static str, keywords: &[String]) -> Result<Self, ConfigError> {
        let mut alternatives: Vec<String> = keywords
            .iter()
            .map(|k| {
                k.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .filter(|k| !k.is_empty())
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { re: None });
        }
        // Longest first so "balance due" wins over "balance" in `find`.
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let pattern = format!(r"(?i)(?:^|[^\w])({})(?:[^\w]|$)", alternatives.join("|"));
        let re = Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
            table,
            reason: e.to_string(),
        })?;
        Ok(Self { re: Some(re) })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// The first keyword occurrence, as written in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.re.as_ref()?.captures(text)?;
        Some(caps.get(1)?.as_str())
    }
}
