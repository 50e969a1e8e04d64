use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fixture_reconcile::fake_feed::{FakeFeedOptions, synthetic_batch};
use fixture_reconcile::report::write_json;
use fixture_reconcile::{EngineConfig, RawRecord, parse_batch_json, reconcile};

const DEFAULT_SYNTHETIC_FIXTURES: usize = 40;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config_path = path_arg(&args, "--config");
    let cfg = EngineConfig::resolve(config_path.as_deref())?;

    let now = Utc::now();
    let records = match path_arg(&args, "--input") {
        Some(path) => load_batch(&path)?,
        None => {
            let fixtures = value_arg(&args, "--synthetic")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_SYNTHETIC_FIXTURES);
            let seed = value_arg(&args, "--seed")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(7);
            warn!("no --input given, reconciling {fixtures} synthetic fixtures (seed {seed})");
            let start = (now + chrono::Duration::days(1)).date_naive();
            synthetic_batch(FakeFeedOptions::new(fixtures, seed, start))
        }
    };
    if records.is_empty() {
        return Err(anyhow!("batch is empty"));
    }

    let output = reconcile(records, &cfg, now);

    println!("{}", output.report.render());
    println!("Canonical records: {}", output.canonical.len());
    println!("Prediction-ready: {}", output.prediction_ready.len());
    for rec in output.prediction_ready.iter().take(20) {
        println!(
            "  {} vs {} @ {} [{}] confidence={:.2} sources={}",
            rec.record.subject_a(),
            rec.record.subject_b(),
            rec.record.event_date.as_deref().unwrap_or("n/a"),
            rec.record.source_tag,
            rec.metadata.confidence_score,
            rec.metadata.sources_confirmed.len()
        );
    }

    if let Some(path) = path_arg(&args, "--out") {
        write_json(&path, &output).context("write reconcile output")?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn load_batch(path: &Path) -> Result<Vec<RawRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read batch {}", path.display()))?;
    parse_batch_json(&raw).with_context(|| format!("parse batch {}", path.display()))
}

fn value_arg(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    value_arg(args, flag).map(PathBuf::from)
}
