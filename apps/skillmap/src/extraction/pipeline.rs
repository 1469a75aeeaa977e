//! Skill Extraction Pipeline: section-weighted, deduplicated skill list per posting.
//!
//! Weights accumulate additively per skill:
//! technical-skills section +3.0, profile section +2.0,
//! responsibilities section +1.5, anywhere in the document +1.0.
//! Soft skills are dropped, the list is sorted by weight (ties keep vocabulary
//! order) and capped.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extraction::cleaner::clean_text;
use crate::extraction::matcher::{
    FuzzyTokenStrategy, MatchStrategy, PatternStrategy, SkillMatcher, DEFAULT_FUZZY_THRESHOLD,
};
use crate::extraction::sections::{
    extract_section, DEFAULT_CONTEXT_LINES, PROFILE_HEADINGS, RESPONSIBILITY_HEADINGS,
    TECHNICAL_HEADINGS,
};
use crate::models::{Posting, WeightedSkill};
use crate::vocabulary::data::{NON_TECH_TITLE_KEYWORDS, SOFT_SKILL_STOPLIST, TECH_INDICATORS};
use crate::vocabulary::SkillVocabulary;

pub const TECHNICAL_SECTION_WEIGHT: f64 = 3.0;
pub const PROFILE_SECTION_WEIGHT: f64 = 2.0;
pub const RESPONSIBILITY_SECTION_WEIGHT: f64 = 1.5;
pub const DOCUMENT_WEIGHT: f64 = 1.0;

pub const DEFAULT_MAX_SKILLS: usize = 20;
pub const DEFAULT_MAX_DESCRIPTION_BYTES: usize = 200_000;

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub context_lines: usize,
    pub max_skills: usize,
    pub max_description_bytes: usize,
    pub fuzzy_threshold: f64,
    /// Postings that do not read as tech jobs keep an empty skill list.
    pub tech_only: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            max_skills: DEFAULT_MAX_SKILLS,
            max_description_bytes: DEFAULT_MAX_DESCRIPTION_BYTES,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            tech_only: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Malformed posting record: {0}")]
    Malformed(String),

    #[error("Posting record has no identifier")]
    MissingIdentifier,

    #[error("Posting text is {len} bytes, limit is {limit}")]
    TooLarge { len: usize, limit: usize },
}

/// A record that could not be extracted. The original record is kept verbatim.
#[derive(Debug)]
pub struct RecordFailure {
    pub index: usize,
    pub id: Option<String>,
    pub error: ExtractionError,
    pub record: Value,
}

/// Serializable view of a failure for run summaries.
#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

impl From<&RecordFailure> for FailureSummary {
    fn from(failure: &RecordFailure) -> Self {
        Self {
            index: failure.index,
            id: failure.id.clone(),
            reason: failure.error.to_string(),
        }
    }
}

pub type RecordOutcome = Result<Posting, RecordFailure>;

/// Per-record outcomes in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn postings(&self) -> impl Iterator<Item = &Posting> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordFailure> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn succeeded(&self) -> usize {
        self.postings().count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// The output stream: annotated postings, and failed records unchanged.
    pub fn output_records(&self) -> Result<Vec<Value>, serde_json::Error> {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                Ok(posting) => serde_json::to_value(posting),
                Err(failure) => Ok(failure.record.clone()),
            })
            .collect()
    }
}

/// Section-weighted skill extractor over a shared vocabulary.
///
/// Detection is delegated to the configured `MatchStrategy` list; a skill is
/// present in a text if any strategy reports it.
pub struct SkillExtractor {
    vocabulary: Arc<SkillVocabulary>,
    strategies: Vec<Box<dyn MatchStrategy>>,
    stoplist: HashSet<&'static str>,
    options: ExtractionOptions,
}

impl SkillExtractor {
    /// Pattern + fuzzy-token detection.
    pub fn new(vocabulary: Arc<SkillVocabulary>, options: ExtractionOptions) -> Self {
        let matcher = SkillMatcher::with_threshold(vocabulary.clone(), options.fuzzy_threshold);
        let strategies: Vec<Box<dyn MatchStrategy>> = vec![
            Box::new(PatternStrategy::new(vocabulary.clone())),
            Box::new(FuzzyTokenStrategy::new(matcher)),
        ];
        Self::with_strategies(vocabulary, strategies, options)
    }

    pub fn with_strategies(
        vocabulary: Arc<SkillVocabulary>,
        strategies: Vec<Box<dyn MatchStrategy>>,
        options: ExtractionOptions,
    ) -> Self {
        Self {
            vocabulary,
            strategies,
            stoplist: SOFT_SKILL_STOPLIST.iter().copied().collect(),
            options,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn detect(&self, text: &str) -> BTreeSet<String> {
        if text.trim().is_empty() {
            return BTreeSet::new();
        }
        self.strategies
            .iter()
            .flat_map(|strategy| strategy.detect(text))
            .collect()
    }

    /// A posting is a tech job when it names a vocabulary skill, or when it
    /// carries two tech indicators and no non-technical title keyword.
    pub fn is_tech_posting(&self, title: &str, description: &str) -> bool {
        let combined = format!("{title}\n{description}");
        if self
            .detect(&combined)
            .iter()
            .any(|skill| !self.stoplist.contains(skill.as_str()))
        {
            return true;
        }
        let lower = combined.to_lowercase();
        if NON_TECH_TITLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return false;
        }
        TECH_INDICATORS.iter().filter(|i| lower.contains(*i)).count() >= 2
    }

    /// Ordered (skill, weight) list for one posting. Pure and deterministic.
    /// A blank description yields no skills, whatever the title says.
    pub fn extract_weighted(&self, title: &str, description: &str) -> Vec<WeightedSkill> {
        if description.trim().is_empty() {
            return Vec::new();
        }
        let context = self.options.context_lines;
        let technical = self.detect(&extract_section(description, TECHNICAL_HEADINGS, context));
        let profile = self.detect(&extract_section(description, PROFILE_HEADINGS, context));
        let responsibilities =
            self.detect(&extract_section(description, RESPONSIBILITY_HEADINGS, context));
        let document = self.detect(&format!("{title}\n{description}"));

        let mut weighted: Vec<WeightedSkill> = self
            .vocabulary
            .entries()
            .iter()
            .filter(|entry| !self.stoplist.contains(entry.canonical.as_str()))
            .filter_map(|entry| {
                let skill = &entry.canonical;
                let mut weight = 0.0;
                if technical.contains(skill) {
                    weight += TECHNICAL_SECTION_WEIGHT;
                }
                if profile.contains(skill) {
                    weight += PROFILE_SECTION_WEIGHT;
                }
                if responsibilities.contains(skill) {
                    weight += RESPONSIBILITY_SECTION_WEIGHT;
                }
                if document.contains(skill) {
                    weight += DOCUMENT_WEIGHT;
                }
                (weight > 0.0).then(|| WeightedSkill {
                    skill: skill.clone(),
                    weight,
                })
            })
            .collect();

        // stable: equal weights stay in vocabulary order
        weighted.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        weighted.truncate(self.options.max_skills);
        weighted
    }

    /// Cleans the posting text and fills its skill annotations.
    pub fn annotate(&self, posting: &mut Posting) -> Result<(), ExtractionError> {
        if posting.id.is_empty() {
            return Err(ExtractionError::MissingIdentifier);
        }
        let len = posting.description_text().len();
        if len > self.options.max_description_bytes {
            return Err(ExtractionError::TooLarge {
                len,
                limit: self.options.max_description_bytes,
            });
        }

        let cleaned = clean_text(posting.description_text());
        let title = clean_text(&posting.title);
        let weighted = if self.options.tech_only && !self.is_tech_posting(&title, &cleaned) {
            debug!("Posting {} is not a tech job; no skills extracted", posting.id);
            Vec::new()
        } else {
            self.extract_weighted(&title, &cleaned)
        };
        debug!(
            "Posting {}: {} skills extracted",
            posting.id,
            weighted.len()
        );
        posting.cleaned_text = Some(cleaned);
        posting.set_skills(weighted);
        Ok(())
    }

    /// Parses and annotates one raw record. Never panics; failures carry the
    /// untouched record.
    pub fn process_record(&self, index: usize, record: Value) -> RecordOutcome {
        let id = record_identifier(&record);
        let fail = |error: ExtractionError, record: Value| RecordFailure {
            index,
            id: id.clone(),
            error,
            record,
        };

        if !record.is_object() {
            return Err(fail(
                ExtractionError::Malformed("record is not a JSON object".to_string()),
                record,
            ));
        }

        let mut posting: Posting = match serde_json::from_value(record.clone()) {
            Ok(posting) => posting,
            Err(e) => return Err(fail(ExtractionError::Malformed(e.to_string()), record)),
        };

        match self.annotate(&mut posting) {
            Ok(()) => Ok(posting),
            Err(error) => Err(fail(error, record)),
        }
    }

    /// Processes a whole batch; one bad record never aborts the rest.
    pub fn process_batch(&self, records: Vec<Value>) -> BatchReport {
        info!("Extracting skills from {} posting records", records.len());

        let outcomes: Vec<RecordOutcome> = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| self.process_record(index, record))
            .collect();

        let report = BatchReport { outcomes };
        for failure in report.failures() {
            warn!(
                "Record {} ({}) kept unmodified: {}",
                failure.index,
                failure.id.as_deref().unwrap_or("no id"),
                failure.error
            );
        }
        info!(
            "Skill extraction complete: {} extracted, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }
}

fn record_identifier(record: &Value) -> Option<String> {
    ["id", "job_id"]
        .iter()
        .find_map(|key| record.get(*key))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
