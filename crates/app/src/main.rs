//! Batch receipt field extraction over PaddleOCR result dumps.
//!
//! ```bash
//! tally scans/                       # every *.json in scans/, records on stdout
//! tally --config it.toml -o out.jsonl --jobs 4 a.json b.json
//! ```

mod batch;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tally_core::ExtractionConfig;
use tally_ocr::Extractor;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract date, vendor, total, currency and location from OCR'd receipts", long_about = None)]
struct Cli {
    /// TOML file overriding extraction thresholds and keyword tables
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Write JSON lines here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Number of extraction threads (defaults to number of CPUs)
    #[arg(long, short, env = "TALLY_JOBS")]
    jobs: Option<usize>,

    /// PaddleOCR JSON dumps, or directories containing them
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExtractionConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    let review_threshold = config.review_threshold;
    let extractor = Extractor::new(config).context("invalid extraction config")?;

    let paths = batch::collect_inputs(&cli.inputs).await?;
    let documents = batch::load_documents(&paths).await;
    info!(files = paths.len(), documents = documents.len(), "loaded OCR dumps");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs.unwrap_or(0))
        .build()
        .context("building worker pool")?;
    let records = tokio::task::spawn_blocking(move || {
        pool.install(|| extractor.extract_batch(&documents))
    })
    .await?;

    let lines = batch::to_json_lines(&records)?;
    match &cli.output {
        Some(path) => tokio::fs::write(path, lines)
            .await
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(lines.as_bytes())?;
            stdout.flush()?;
        }
    }

    info!("{}", batch::Summary::from_records(&records, review_threshold));
    Ok(())
}
