//! Skill Matcher: resolves a text token to a canonical skill with a confidence,
//! plus the pluggable detection strategies the extraction pipeline runs over
//! whole sections.
//!
//! Resolution order for a single token:
//! 1. tokens of length <= 2 are rejected unless whitelisted
//! 2. exact (case-insensitive) vocabulary hit → confidence 1.0
//! 3. fuzzy: normalized Levenshtein similarity against every variant whose
//!    length is within 4 characters of the token; best score >= threshold wins.
//!    Equal scores keep the variant registered first.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::vocabulary::{is_short_token_allowed, SkillVocabulary};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.75;

/// Variants whose length differs from the token by more than this are skipped.
const MAX_LENGTH_DELTA: usize = 4;

/// A token resolved to a canonical skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub canonical: String,
    pub category: String,
    /// 1.0 for exact hits, the similarity ratio for fuzzy hits.
    pub confidence: f64,
}

/// Exact + fuzzy token resolution against a shared vocabulary.
#[derive(Debug, Clone)]
pub struct SkillMatcher {
    vocabulary: Arc<SkillVocabulary>,
    threshold: f64,
}

impl SkillMatcher {
    pub fn new(vocabulary: Arc<SkillVocabulary>) -> Self {
        Self::with_threshold(vocabulary, DEFAULT_FUZZY_THRESHOLD)
    }

    pub fn with_threshold(vocabulary: Arc<SkillVocabulary>, threshold: f64) -> Self {
        Self {
            vocabulary,
            threshold,
        }
    }

    /// Resolves `token` using the matcher's default threshold.
    pub fn match_token(&self, token: &str) -> Option<SkillMatch> {
        self.match_token_with(token, self.threshold)
    }

    pub fn match_token_with(&self, token: &str, threshold: f64) -> Option<SkillMatch> {
        let token = token.trim().to_lowercase();
        if token.is_empty() || !is_short_token_allowed(&token) {
            return None;
        }

        if let Some(entry) = self.vocabulary.lookup(&token) {
            return Some(SkillMatch {
                canonical: entry.canonical.clone(),
                category: entry.category.clone(),
                confidence: 1.0,
            });
        }

        let token_len = token.chars().count();
        let mut best: Option<SkillMatch> = None;
        let mut best_score = 0.0_f64;

        for (variant, entry) in self.vocabulary.variants() {
            if token_len.abs_diff(variant.chars().count()) > MAX_LENGTH_DELTA {
                continue;
            }
            let ratio = strsim::normalized_levenshtein(&token, variant);
            if ratio > best_score && ratio >= threshold {
                best_score = ratio;
                best = Some(SkillMatch {
                    canonical: entry.canonical.clone(),
                    category: entry.category.clone(),
                    confidence: ratio,
                });
            }
        }

        best
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Detection strategies
// ────────────────────────────────────────────────────────────────────────────

/// A way of finding canonical skills in a block of text. The extraction
/// pipeline unions the results of every configured strategy.
pub trait MatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Canonical names of every skill detected in `text`.
    fn detect(&self, text: &str) -> BTreeSet<String>;
}

/// Scans the text with each entry's compiled variant pattern.
pub struct PatternStrategy {
    vocabulary: Arc<SkillVocabulary>,
}

impl PatternStrategy {
    pub fn new(vocabulary: Arc<SkillVocabulary>) -> Self {
        Self { vocabulary }
    }
}

impl MatchStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn detect(&self, text: &str) -> BTreeSet<String> {
        if text.trim().is_empty() {
            return BTreeSet::new();
        }
        self.vocabulary
            .entries()
            .iter()
            .filter(|entry| entry.occurs_in(text))
            .map(|entry| entry.canonical.clone())
            .collect()
    }
}

/// Splits the text into list-like tokens and resolves each through the matcher.
pub struct FuzzyTokenStrategy {
    matcher: SkillMatcher,
}

impl FuzzyTokenStrategy {
    pub fn new(matcher: SkillMatcher) -> Self {
        Self { matcher }
    }
}

impl MatchStrategy for FuzzyTokenStrategy {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn detect(&self, text: &str) -> BTreeSet<String> {
        tokenize_skills(text)
            .iter()
            .filter_map(|token| self.matcher.match_token(token))
            .map(|m| m.canonical)
            .collect()
    }
}

static DELIMITERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,;:|•·\n]|\s+(?:and|or|with|et|ou|avec)\s+")
        .expect("delimiter pattern is valid")
});

static FILLER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:using|knowledge of|experience in|experience with|proficiency in|familiarity with|basic|advanced|intermediate|years of|experience|strong|good|solid|fluent|proficient|certified|hands-on|maîtrise de|connaissance de)\s+",
    )
    .expect("filler prefix pattern is valid")
});

static FILLER_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+(?:required|preferred|optional|desired|is a plus|a plus|souhaité|requis)\s*$")
        .expect("filler suffix pattern is valid")
});

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern is valid"));

/// Splits text into candidate skill tokens, lowercased and stripped of filler.
pub fn tokenize_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let without_parens = PARENTHETICAL.replace_all(&lower, " ");

    DELIMITERS
        .split(&without_parens)
        .filter_map(|raw| {
            let mut token = raw
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .trim_start_matches(['-', '*', '•', '·', ' '])
                .trim_end_matches(['.', '!', '?', ' '])
                .to_string();

            // a few fillers stack ("strong experience with")
            for _ in 0..3 {
                let stripped = FILLER_PREFIX.replace(&token, "").into_owned();
                if stripped == token {
                    break;
                }
                token = stripped;
            }
            token = FILLER_SUFFIX.replace(&token, "").trim().to_string();

            let starts_with_digit = token.chars().next().is_some_and(|c| c.is_ascii_digit());
            if token.is_empty() || starts_with_digit || !is_short_token_allowed(&token) {
                None
            } else {
                Some(token)
            }
        })
        .collect()
}
