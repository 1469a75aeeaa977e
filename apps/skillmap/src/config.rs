use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::clustering::engine::{DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_SIMILARITY};
use crate::clustering::{ClusterOptions, MergeStrategy};
use crate::extraction::pipeline::{DEFAULT_MAX_DESCRIPTION_BYTES, DEFAULT_MAX_SKILLS};
use crate::extraction::ExtractionOptions;
use crate::market::DEFAULT_TOP_SKILLS;

/// Run configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub postings_path: PathBuf,
    pub candidates_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub min_similarity: f64,
    pub max_iterations: usize,
    pub merge_strategy: MergeStrategy,
    pub min_corpus_size: usize,
    pub top_skills: usize,
    pub max_skills_per_posting: usize,
    pub max_description_bytes: usize,
    /// Leave postings that do not look like tech jobs without skills.
    pub tech_only: bool,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            postings_path: PathBuf::from("data/raw/postings.json"),
            candidates_path: None,
            output_dir: PathBuf::from("data/processed"),
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            merge_strategy: MergeStrategy::default(),
            min_corpus_size: 10,
            top_skills: DEFAULT_TOP_SKILLS,
            max_skills_per_posting: DEFAULT_MAX_SKILLS,
            max_description_bytes: DEFAULT_MAX_DESCRIPTION_BYTES,
            tech_only: false,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            postings_path: PathBuf::from(require_env("POSTINGS_PATH")?),
            candidates_path: std::env::var("CANDIDATES_PATH").ok().map(PathBuf::from),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            min_similarity: parse_env("MIN_SIMILARITY", defaults.min_similarity)?,
            max_iterations: parse_env("MAX_ITERATIONS", defaults.max_iterations)?,
            merge_strategy: std::env::var("MERGE_STRATEGY")
                .ok()
                .map(|v| v.parse::<MergeStrategy>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("MERGE_STRATEGY is invalid")?
                .unwrap_or(defaults.merge_strategy),
            min_corpus_size: parse_env("MIN_CORPUS_SIZE", defaults.min_corpus_size)?,
            top_skills: parse_env("TOP_SKILLS", defaults.top_skills)?,
            max_skills_per_posting: parse_env("MAX_SKILLS_PER_POSTING", defaults.max_skills_per_posting)?,
            max_description_bytes: parse_env("MAX_DESCRIPTION_BYTES", defaults.max_description_bytes)?,
            tech_only: parse_env("TECH_ONLY", defaults.tech_only)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_similarity > 0.0 && self.min_similarity <= 1.0) {
            bail!("MIN_SIMILARITY must be in (0, 1], got {}", self.min_similarity);
        }
        if self.top_skills == 0 {
            bail!("TOP_SKILLS must be at least 1");
        }
        if self.max_skills_per_posting == 0 {
            bail!("MAX_SKILLS_PER_POSTING must be at least 1");
        }
        Ok(())
    }

    pub fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            min_similarity: self.min_similarity,
            max_iterations: self.max_iterations,
            strategy: self.merge_strategy,
        }
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions {
            max_skills: self.max_skills_per_posting,
            max_description_bytes: self.max_description_bytes,
            tech_only: self.tech_only,
            ..ExtractionOptions::default()
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
