use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tally_core::Record;
use tally_ocr::{document_id, parse_paddle_json, TextBox};
use tracing::{debug, warn};

/// Expand the command-line inputs into a list of dump files. Directories
/// contribute their `*.json` entries in name order; plain files are taken
/// as given.
pub async fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let meta = tokio::fs::metadata(input)
            .await
            .with_context(|| format!("cannot read input {}", input.display()))?;
        if !meta.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(input)
            .await
            .with_context(|| format!("cannot list directory {}", input.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_json(&path) && entry.file_type().await?.is_file() {
                found.push(path);
            }
        }
        found.sort();
        debug!(dir = %input.display(), files = found.len(), "scanned directory");
        files.extend(found);
    }
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Read and decode every dump. Unreadable or malformed files are logged and
/// skipped so one bad file does not sink the batch.
pub async fn load_documents(paths: &[PathBuf]) -> Vec<(String, Vec<TextBox>)> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        match parse_paddle_json(&content) {
            Ok(boxes) => documents.push((document_id(path), boxes)),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping malformed OCR dump"),
        }
    }
    documents
}

/// One JSON object per line, in input order.
pub fn to_json_lines(records: &[Record]) -> serde_json::Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub documents: usize,
    pub needs_review: usize,
    /// Sum of totals keyed by currency code; totals with no detected
    /// currency are kept under `"unknown"`.
    pub totals: BTreeMap<String, Decimal>,
}

impl Summary {
    pub fn from_records(records: &[Record], review_threshold: f32) -> Self {
        let mut summary = Summary { documents: records.len(), ..Default::default() };
        for record in records {
            if record.needs_review(review_threshold) {
                summary.needs_review += 1;
            }
            if let Some(total) = record.total {
                let currency = record.currency.clone().unwrap_or_else(|| "unknown".into());
                *summary.totals.entry(currency).or_default() += total;
            }
        }
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} documents, {} need review", self.documents, self.needs_review)?;
        for (i, (currency, total)) in self.totals.iter().enumerate() {
            let sep = if i == 0 { "; totals: " } else { ", " };
            write!(f, "{sep}{currency} {total}")?;
        }
        Ok(())
    }
}
