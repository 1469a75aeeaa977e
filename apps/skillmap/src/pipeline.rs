//! Run orchestration: extract → cluster → aggregate → recommend, then artifacts.
//!
//! `run_market` is synchronous and CPU-bound. Candidate analyses only read the
//! resulting `MarketRun`, so callers may fan them out across workers.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clustering::{apply_clusters, cluster_postings, effective_threshold, ClusterOptions, MergeStrategy};
use crate::errors::AppError;
use crate::export;
use crate::extraction::{BatchReport, FailureSummary};
use crate::market::{CorpusStats, MarketModel, DEFAULT_TOP_TITLES};
use crate::models::{CandidateProfile, Posting, UNCLUSTERED};
use crate::recommendation::archetype::DEFAULT_RECOMMENDATIONS;
use crate::recommendation::{analyze_candidate, render_gap_report, ArchetypeReport, GapReport};
use crate::state::AppState;

/// Everything computed from one posting corpus.
pub struct MarketRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub batch: BatchReport,
    /// Extraction output stream, before clustering.
    pub postings_with_skills: Vec<Value>,
    /// Successfully extracted postings with their cluster ids.
    pub postings: Vec<Posting>,
    pub base_threshold: f64,
    /// Options actually used, with the corpus-adjusted threshold.
    pub cluster_options: ClusterOptions,
    pub market: MarketModel,
    pub corpus: CorpusStats,
    pub recommendations: BTreeMap<String, ArchetypeReport>,
}

impl MarketRun {
    /// Output stream with cluster ids; failed records carry the sentinel.
    pub fn clustered_records(&self) -> Result<Vec<Value>, AppError> {
        let mut clustered = self.postings.iter();
        let mut records = Vec::with_capacity(self.batch.outcomes.len());
        for outcome in &self.batch.outcomes {
            match outcome {
                Ok(_) => {
                    if let Some(posting) = clustered.next() {
                        records.push(serde_json::to_value(posting)?);
                    }
                }
                Err(failure) => {
                    let mut record = failure.record.clone();
                    if let Value::Object(map) = &mut record {
                        map.insert("cluster".to_string(), Value::from(UNCLUSTERED));
                    }
                    records.push(record);
                }
            }
        }
        Ok(records)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records_total: usize,
    pub records_failed: usize,
    pub failures: Vec<FailureSummary>,
    pub corpus: CorpusStats,
    pub base_threshold: f64,
    pub effective_threshold: f64,
    pub merge_strategy: MergeStrategy,
    pub max_iterations: usize,
    pub cluster_count: usize,
    pub archetypes: usize,
    pub candidates_analyzed: usize,
    pub candidates_skipped: usize,
}

/// Extracts, clusters and aggregates one corpus of raw posting records.
pub fn run_market(state: &AppState, records: Vec<Value>) -> Result<MarketRun, AppError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("Run {} started with {} records", run_id, records.len());

    let mut batch = state.extractor.process_batch(records);
    let postings_with_skills = batch.output_records()?;

    let mut postings: Vec<Posting> = batch.postings().cloned().collect();
    let config = &state.config;
    let threshold = effective_threshold(postings.len(), config.min_similarity, config.min_corpus_size);
    if threshold < config.min_similarity {
        info!(
            "Corpus of {} postings is below {}; threshold lowered from {:.3} to {:.3}",
            postings.len(),
            config.min_corpus_size,
            config.min_similarity,
            threshold
        );
    }
    let cluster_options = ClusterOptions {
        min_similarity: threshold,
        ..config.cluster_options()
    };

    let clusters = cluster_postings(&postings, &cluster_options);
    apply_clusters(&mut postings, &clusters);
    let extracted = batch.outcomes.iter_mut().filter_map(|o| o.as_mut().ok());
    for (slot, posting) in extracted.zip(&postings) {
        slot.cluster = posting.cluster;
    }

    let market = MarketModel::aggregate(&postings, config.top_skills, DEFAULT_TOP_TITLES);
    let corpus = CorpusStats::from_postings(&postings);

    let recommendations = if market.is_empty() {
        warn!("No clusters formed; archetype recommendations skipped");
        BTreeMap::new()
    } else {
        state.recommender.recommend_all(&market, DEFAULT_RECOMMENDATIONS)?
    };

    Ok(MarketRun {
        run_id,
        started_at,
        batch,
        postings_with_skills,
        postings,
        base_threshold: config.min_similarity,
        cluster_options,
        market,
        corpus,
        recommendations,
    })
}

/// Gap reports for every candidate. A candidate whose cluster cannot be
/// resolved is skipped and logged.
pub fn analyze_candidates(candidates: &[CandidateProfile], market: &MarketModel) -> Vec<GapReport> {
    candidates
        .iter()
        .filter_map(|candidate| match analyze_candidate(candidate, market) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Candidate {} skipped: {}", candidate.name, e);
                None
            }
        })
        .collect()
}

/// Writes every artifact of the run into `dir` and returns the summary.
pub fn write_artifacts(
    dir: &Path,
    run: &MarketRun,
    gap_reports: &[GapReport],
    candidates_skipped: usize,
) -> Result<RunSummary, AppError> {
    export::write_json(dir, export::POSTINGS_WITH_SKILLS, &run.postings_with_skills)?;
    export::write_json(dir, export::CLUSTERED_POSTINGS, &run.clustered_records()?)?;
    export::write_json(dir, export::CLUSTER_STATS, &run.market)?;
    export::write_json(dir, export::GAP_REPORTS, gap_reports)?;
    export::write_json(dir, export::ARCHETYPE_RECOMMENDATIONS, &run.recommendations)?;

    if !gap_reports.is_empty() {
        let text = gap_reports
            .iter()
            .map(render_gap_report)
            .collect::<Vec<_>>()
            .join("\n\n");
        export::write_text(dir, export::GAP_REPORTS_TEXT, &text)?;
    }

    let failures: Vec<FailureSummary> = run.batch.failures().map(FailureSummary::from).collect();
    let summary = RunSummary {
        run_id: run.run_id,
        started_at: run.started_at,
        finished_at: Utc::now(),
        records_total: run.batch.outcomes.len(),
        records_failed: failures.len(),
        failures,
        corpus: run.corpus.clone(),
        base_threshold: run.base_threshold,
        effective_threshold: run.cluster_options.min_similarity,
        merge_strategy: run.cluster_options.strategy,
        max_iterations: run.cluster_options.max_iterations,
        cluster_count: run.market.len(),
        archetypes: run.recommendations.len(),
        candidates_analyzed: gap_reports.len(),
        candidates_skipped,
    };
    export::write_json(dir, export::RUN_SUMMARY, &summary)?;

    info!(
        "Run {} complete: {} clusters, {} gap reports, artifacts in {}",
        summary.run_id,
        summary.cluster_count,
        summary.candidates_analyzed,
        dir.display()
    );
    Ok(summary)
}
