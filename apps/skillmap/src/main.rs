use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillmap::config::Config;
use skillmap::models::CandidateProfile;
use skillmap::pipeline::{run_market, write_artifacts};
use skillmap::recommendation::{analyze_candidate, GapReport};
use skillmap::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting skillmap v{}", env!("CARGO_PKG_VERSION"));

    let state = match AppState::new(config.clone()) {
        Ok(state) => state,
        Err(e) if e.is_fatal() => {
            error!(code = e.code(), "Invalid configuration: {e}");
            return Err(e.into());
        }
        Err(e) => {
            error!(code = e.code(), "Startup failed: {e}");
            return Err(e.into());
        }
    };

    let records: Vec<Value> = read_json(&config.postings_path).await?;
    let candidates: Vec<CandidateProfile> = match &config.candidates_path {
        Some(path) => read_json(path).await?,
        None => Vec::new(),
    };
    info!(
        "Loaded {} posting records and {} candidates",
        records.len(),
        candidates.len()
    );

    // Extraction and clustering are CPU-bound; keep them off the async executor.
    let market_state = state.clone();
    let run = tokio::task::spawn_blocking(move || run_market(&market_state, records))
        .await
        .context("market run task failed")??;
    let run = std::sync::Arc::new(run);

    // Candidate analyses only read the market model; run them concurrently.
    let mut tasks = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let run = run.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let name = candidate.name.clone();
            (name, analyze_candidate(&candidate, &run.market))
        }));
    }

    let mut reports: Vec<GapReport> = Vec::with_capacity(tasks.len());
    let mut skipped = 0;
    for task in tasks {
        let (name, outcome) = task.await.context("candidate analysis task failed")?;
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) if e.is_fatal() => {
                error!(code = e.code(), "Candidate {name} aborted the run: {e}");
                return Err(e.into());
            }
            Err(e) => {
                skipped += 1;
                error!(code = e.code(), "Candidate {name} skipped: {e}");
            }
        }
    }

    let summary = write_artifacts(&config.output_dir, &run, &reports, skipped)?;
    info!(
        "Run {} finished: {} records ({} failed), {} clusters at threshold {:.3}",
        summary.run_id,
        summary.records_total,
        summary.records_failed,
        summary.cluster_count,
        summary.effective_threshold
    );

    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
