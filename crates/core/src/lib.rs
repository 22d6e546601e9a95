pub mod config;
pub mod record;

pub use config::{ConfigError, ExtractionConfig, KeywordTables, LocaleProfile, ScoringWeights};
pub use record::{FieldScores, Record};
