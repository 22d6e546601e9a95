use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f32 },
    #[error("{field} must be a finite positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be at least 1")]
    EmptyWindow { field: &'static str },
    #[error("'{key}' in {table} maps to '{code}', which is not a 3-letter ISO code")]
    InvalidCurrencyCode { table: &'static str, key: String, code: String },
    #[error("{table} contains an empty entry")]
    EmptyEntry { table: &'static str },
    #[error("{table} must not be empty")]
    EmptyTable { table: &'static str },
    #[error("invalid pattern in {table}: {reason}")]
    InvalidPattern { table: &'static str, reason: String },
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Relative weights used when blending score components.
///
/// `keyword` and `position` weigh keyword proximity against line position for
/// date, total and location candidates. `height` takes the keyword slot for
/// vendor candidates, where prominence stands in for a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub keyword: f32,
    pub position: f32,
    pub height: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { keyword: 0.6, position: 0.4, height: 0.6 }
    }
}

/// Keyword lists consulted by the field detectors. Matching is
/// case-insensitive on word boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTables {
    pub date: Vec<String>,
    pub total: Vec<String>,
    /// Lines mentioning any of these never yield a total (subtotal, tax, change…).
    pub total_exclude: Vec<String>,
    /// Tendered-amount lines; their amounts cap the unlabeled total fallback.
    pub tender: Vec<String>,
    pub vendor_skip: Vec<String>,
    pub vendor_suffixes: Vec<String>,
    pub address: Vec<String>,
    pub address_label: Vec<String>,
    pub location_penalty: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            date: strings(&["date", "dated", "issued", "data"]),
            total: strings(&[
                "total", "grand total", "total due", "amount due", "balance", "balance due",
                "amount", "charge", "totale", "importo",
            ]),
            total_exclude: strings(&[
                "subtotal", "sub total", "sub-total", "tax", "vat", "change", "tip", "tips",
                "gratuity", "discount", "subtotale", "imponibile", "resto", "sconto", "iva",
            ]),
            tender: strings(&["cash", "tender", "tendered", "paid", "contanti", "contante", "versamento"]),
            vendor_skip: strings(&[
                "receipt", "invoice", "welcome", "copy", "guest", "table", "server", "order",
                "merchant", "scontrino", "documento", "commerciale", "cliente", "fattura",
            ]),
            vendor_suffixes: strings(&[
                "inc", "llc", "ltd", "corp", "co", "gmbh", "spa", "s.p.a", "srl", "s.r.l", "snc",
            ]),
            address: strings(&[
                "street", "st", "ave", "avenue", "blvd", "boulevard", "road", "rd", "drive",
                "lane", "ln", "way", "highway", "hwy", "pkwy", "suite", "city", "via", "viale",
                "piazza", "corso", "largo", "strada", "vicolo",
            ]),
            address_label: strings(&["address", "addr", "location", "indirizzo", "sede"]),
            location_penalty: strings(&[
                "tel", "phone", "fax", "vat", "order", "table", "guest", "iban", "card", "acct",
                "p.iva", "tax id",
            ]),
        }
    }
}

/// Marker words that identify a receipt's language and how it orders
/// ambiguous numeric dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleProfile {
    pub name: String,
    pub markers: Vec<String>,
    /// `true` reads `03/04/2024` as 3 April, `false` as March 4.
    pub day_first: bool,
}

/// Every tunable of the extraction core. Missing TOML keys fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Boxes recognized with lower confidence are discarded.
    pub confidence_floor: f32,
    /// Fraction of the median box height two centers may differ by and still
    /// share a line.
    pub line_overlap_ratio: f32,
    /// How many lines from the top are considered for the vendor name.
    pub vendor_window: usize,
    /// Lines below a bare "Total" label searched for its amount.
    pub total_lookahead: usize,
    /// Bottom lines scanned for unlabeled amounts when no total keyword matches.
    pub fallback_window: usize,
    pub review_threshold: f32,
    pub weights: ScoringWeights,
    /// Symbol → ISO 4217 code, matched anywhere in a line. TOML entries are
    /// added to the built-in table, overriding symbols it already has.
    #[serde(deserialize_with = "over_default_symbols")]
    pub currency_symbols: BTreeMap<String, String>,
    /// Word → ISO 4217 code, matched as whole words. Merged like
    /// `currency_symbols`.
    #[serde(deserialize_with = "over_default_codes")]
    pub currency_codes: BTreeMap<String, String>,
    pub keywords: KeywordTables,
    /// Ties in marker counts go to the profile listed first.
    pub locales: Vec<LocaleProfile>,
}

fn default_currency_symbols() -> BTreeMap<String, String> {
    [
        ("$", "USD"), ("€", "EUR"), ("£", "GBP"), ("¥", "JPY"), ("₹", "INR"),
        ("₩", "KRW"), ("₽", "RUB"), ("₺", "TRY"), ("₪", "ILS"), ("₱", "PHP"), ("฿", "THB"),
    ]
    .iter()
    .map(|(s, c)| (s.to_string(), c.to_string()))
    .collect()
}

fn default_currency_codes() -> BTreeMap<String, String> {
    let mut codes: BTreeMap<String, String> = [
        "USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "INR", "CNY", "SEK", "NOK", "DKK",
        "PLN", "MXN", "BRL",
    ]
    .iter()
    .map(|c| (c.to_string(), c.to_string()))
    .collect();
    codes.insert("EURO".into(), "EUR".into());
    codes.insert("EUROS".into(), "EUR".into());
    codes
}

fn over_default_symbols<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
    let mut table = default_currency_symbols();
    table.extend(BTreeMap::<String, String>::deserialize(d)?);
    Ok(table)
}

fn over_default_codes<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
    let mut table = default_currency_codes();
    table.extend(BTreeMap::<String, String>::deserialize(d)?);
    Ok(table)
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.3,
            line_overlap_ratio: 0.5,
            vendor_window: 5,
            total_lookahead: 1,
            fallback_window: 15,
            review_threshold: 0.7,
            weights: ScoringWeights::default(),
            currency_symbols: default_currency_symbols(),
            currency_codes: default_currency_codes(),
            keywords: KeywordTables::default(),
            locales: vec![
                LocaleProfile {
                    name: "en".into(),
                    markers: strings(&[
                        "TOTAL", "RECEIPT", "TAX", "TIPS", "GRATUITY", "CHANGE", "CASH",
                        "SUBTOTAL", "AVE", "BLVD", "STREET",
                    ]),
                    day_first: false,
                },
                LocaleProfile {
                    name: "it".into(),
                    markers: strings(&[
                        "TOTALE", "SCONTRINO", "P.IVA", "EURO", "IMPORTO", "CASSA", "SERVIZIO",
                        "COPERTO", "VIA ", "PIAZZA ",
                    ]),
                    day_first: true,
                },
            ],
        }
    }
}

impl ExtractionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject malformed thresholds and tables before any document is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_interval("confidence_floor", self.confidence_floor)?;
        unit_interval("review_threshold", self.review_threshold)?;
        positive("line_overlap_ratio", self.line_overlap_ratio)?;
        if self.vendor_window == 0 {
            return Err(ConfigError::EmptyWindow { field: "vendor_window" });
        }
        if self.fallback_window == 0 {
            return Err(ConfigError::EmptyWindow { field: "fallback_window" });
        }

        let w = &self.weights;
        for (field, value) in [
            ("weights.keyword", w.keyword),
            ("weights.position", w.position),
            ("weights.height", w.height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        positive("weights.keyword + weights.position", w.keyword + w.position)?;
        positive("weights.height + weights.position", w.height + w.position)?;

        currency_table("currency_symbols", &self.currency_symbols)?;
        currency_table("currency_codes", &self.currency_codes)?;

        let k = &self.keywords;
        if k.total.is_empty() {
            return Err(ConfigError::EmptyTable { table: "keywords.total" });
        }
        for (table, list) in [
            ("keywords.date", &k.date),
            ("keywords.total", &k.total),
            ("keywords.total_exclude", &k.total_exclude),
            ("keywords.tender", &k.tender),
            ("keywords.vendor_skip", &k.vendor_skip),
            ("keywords.vendor_suffixes", &k.vendor_suffixes),
            ("keywords.address", &k.address),
            ("keywords.address_label", &k.address_label),
            ("keywords.location_penalty", &k.location_penalty),
        ] {
            no_blank(table, list)?;
        }

        if self.locales.is_empty() {
            return Err(ConfigError::EmptyTable { table: "locales" });
        }
        for locale in &self.locales {
            if locale.name.trim().is_empty() {
                return Err(ConfigError::EmptyEntry { table: "locales" });
            }
            no_blank("locales.markers", &locale.markers)?;
        }
        Ok(())
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn no_blank(table: &'static str, list: &[String]) -> Result<(), ConfigError> {
    if list.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::EmptyEntry { table });
    }
    Ok(())
}

fn currency_table(table: &'static str, map: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    for (key, code) in map {
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyEntry { table });
        }
        let iso = code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase());
        if !iso {
            return Err(ConfigError::InvalidCurrencyCode {
                table,
                key: key.clone(),
                code: code.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        ExtractionConfig::default().validate().unwrap();
    }

    #[test]
    fn confidence_floor_out_of_range_rejected() {
        let config = ExtractionConfig { confidence_floor: 1.5, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "confidence_floor", .. })
        ));
    }

    #[test]
    fn nan_overlap_ratio_rejected() {
        let config = ExtractionConfig { line_overlap_ratio: f32::NAN, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { .. })));
    }

    #[test]
    fn zero_vendor_window_rejected() {
        let config = ExtractionConfig { vendor_window: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyWindow { .. })));
    }

    #[test]
    fn negative_weight_rejected() {
        let mut config = ExtractionConfig::default();
        config.weights.position = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_zero_weights_rejected() {
        let mut config = ExtractionConfig::default();
        config.weights = ScoringWeights { keyword: 0.0, position: 0.0, height: 0.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn lowercase_currency_code_rejected() {
        let mut config = ExtractionConfig::default();
        config.currency_symbols.insert("R$".into(), "brl".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("R$"), "{err}");
    }

    #[test]
    fn blank_keyword_rejected() {
        let mut config = ExtractionConfig::default();
        config.keywords.address.push("  ".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyEntry { table: "keywords.address" })
        ));
    }

    #[test]
    fn missing_total_keywords_rejected() {
        let mut config = ExtractionConfig::default();
        config.keywords.total.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTable { .. })));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ExtractionConfig::from_toml_str(
            r#"
            confidence_floor = 0.5
            vendor_window = 3

            [weights]
            keyword = 0.8

            [currency_symbols]
            "R$" = "BRL"
            "#,
        )
        .unwrap();
        assert_eq!(config.confidence_floor, 0.5);
        assert_eq!(config.vendor_window, 3);
        assert_eq!(config.weights.keyword, 0.8);
        assert_eq!(config.weights.position, 0.4);
        assert_eq!(config.line_overlap_ratio, 0.5);
        assert_eq!(config.currency_symbols.get("R$").map(String::as_str), Some("BRL"));
        assert_eq!(config.keywords, KeywordTables::default());
    }

    #[test]
    fn currency_tables_extend_builtins() {
        let config = ExtractionConfig::from_toml_str(
            r#"
            [currency_symbols]
            "R$" = "BRL"
            "¥" = "CNY"

            [currency_codes]
            REAIS = "BRL"
            "#,
        )
        .unwrap();
        let symbol = |s: &str| config.currency_symbols.get(s).map(String::as_str);
        assert_eq!(symbol("R$"), Some("BRL"));
        assert_eq!(symbol("$"), Some("USD"));
        assert_eq!(symbol("€"), Some("EUR"));
        assert_eq!(symbol("£"), Some("GBP"));
        assert_eq!(symbol("¥"), Some("CNY"));
        assert_eq!(config.currency_symbols.len(), ExtractionConfig::default().currency_symbols.len() + 1);
        assert_eq!(config.currency_codes.get("REAIS").map(String::as_str), Some("BRL"));
        assert_eq!(config.currency_codes.get("EURO").map(String::as_str), Some("EUR"));
    }

    #[test]
    fn merged_currency_entries_are_validated() {
        let err = ExtractionConfig::from_toml_str("[currency_symbols]\n\"R$\" = \"brl\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCurrencyCode { .. }));
    }

    #[test]
    fn invalid_toml_value_fails_fast() {
        let err = ExtractionConfig::from_toml_str("confidence_floor = 3.0").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = ExtractionConfig::from_toml_str("confidence_floor = [").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fallback_window = 10").unwrap();
        let config = ExtractionConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.fallback_window, 10);
    }
}
