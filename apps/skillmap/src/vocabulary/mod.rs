//! Skill Vocabulary: the canonical skill table with categories, spelling
//! variants and acronyms.
//!
//! Built once from static data and shared read-only (`Arc<SkillVocabulary>`).
//! Keys are case-insensitive. A malformed table is a startup error.

pub mod data;

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use data::{ACRONYMS, SHORT_TOKEN_WHITELIST, SKILL_TABLE};

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Duplicate canonical skill '{0}'")]
    DuplicateCanonical(String),

    #[error("Variant '{variant}' maps to both '{first}' and '{second}'")]
    ConflictingVariant {
        variant: String,
        first: String,
        second: String,
    },

    #[error("Empty variant registered for '{0}'")]
    EmptyVariant(String),

    #[error("Acronym '{acronym}' points at unknown skill '{canonical}'")]
    UnknownAcronymTarget { acronym: String, canonical: String },

    #[error("Invalid match pattern for '{canonical}': {source}")]
    Pattern {
        canonical: String,
        #[source]
        source: regex::Error,
    },
}

/// One canonical skill and every spelling that resolves to it.
#[derive(Debug, Clone, Serialize)]
pub struct SkillEntry {
    pub canonical: String,
    pub category: String,
    /// Canonical first, then listed and generated spellings.
    pub variants: Vec<String>,
    pub acronyms: Vec<String>,
    /// Matches any eligible variant or acronym between non-alphanumeric boundaries.
    #[serde(skip)]
    pub pattern: Option<Regex>,
}

impl SkillEntry {
    /// True if any eligible spelling occurs in `text`.
    pub fn occurs_in(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}

/// Immutable lookup table over all canonical skills.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    entries: Vec<SkillEntry>,
    /// lowercase key (canonical, variant or acronym) → index into `entries`
    index: HashMap<String, usize>,
    /// Every (variant, entry) pair in registration order, for fuzzy scans.
    variants: Vec<(String, usize)>,
}

/// Whether a token of this length may be matched at all.
pub fn is_short_token_allowed(token: &str) -> bool {
    token.chars().count() > 2 || SHORT_TOKEN_WHITELIST.contains(&token)
}

impl SkillVocabulary {
    /// Builds the vocabulary from the bundled tables.
    pub fn builtin() -> Result<Self, VocabularyError> {
        Self::from_tables(SKILL_TABLE, ACRONYMS)
    }

    pub fn from_tables(
        table: &[(&str, &[(&str, &[&str])])],
        acronyms: &[(&str, &str)],
    ) -> Result<Self, VocabularyError> {
        let mut entries: Vec<SkillEntry> = Vec::new();
        let mut canonical_index: HashMap<String, usize> = HashMap::new();

        for (category, skills) in table {
            for (canonical, listed) in skills.iter() {
                let canonical = canonical.trim().to_lowercase();
                if canonical.is_empty() {
                    return Err(VocabularyError::EmptyVariant(category.to_string()));
                }
                if canonical_index.contains_key(&canonical) {
                    return Err(VocabularyError::DuplicateCanonical(canonical));
                }

                let mut variants = vec![canonical.clone()];
                for variant in listed.iter() {
                    let variant = variant.trim().to_lowercase();
                    if variant.is_empty() {
                        return Err(VocabularyError::EmptyVariant(canonical));
                    }
                    push_unique(&mut variants, variant);
                }
                // hyphen/space spellings of every multi-word form
                for variant in variants.clone() {
                    if variant.contains(' ') {
                        push_unique(&mut variants, variant.replace(' ', "-"));
                    }
                    if variant.contains('-') {
                        push_unique(&mut variants, variant.replace('-', " "));
                    }
                }

                canonical_index.insert(canonical.clone(), entries.len());
                entries.push(SkillEntry {
                    canonical,
                    category: category.to_string(),
                    variants,
                    acronyms: Vec::new(),
                    pattern: None,
                });
            }
        }

        for (acronym, canonical) in acronyms {
            let canonical = canonical.to_lowercase();
            let idx = *canonical_index.get(&canonical).ok_or_else(|| {
                VocabularyError::UnknownAcronymTarget {
                    acronym: acronym.to_string(),
                    canonical: canonical.clone(),
                }
            })?;
            push_unique(&mut entries[idx].acronyms, acronym.to_lowercase());
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut variants: Vec<(String, usize)> = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            for key in entry.variants.iter().chain(entry.acronyms.iter()) {
                if let Some(&existing) = index.get(key) {
                    if existing != idx {
                        return Err(VocabularyError::ConflictingVariant {
                            variant: key.clone(),
                            first: entries[existing].canonical.clone(),
                            second: entry.canonical.clone(),
                        });
                    }
                    continue;
                }
                index.insert(key.clone(), idx);
                variants.push((key.clone(), idx));
            }
        }

        for entry in entries.iter_mut() {
            entry.pattern = build_pattern(entry)?;
        }

        info!(
            "Skill vocabulary built: {} skills, {} lookup keys",
            entries.len(),
            index.len()
        );

        Ok(Self {
            entries,
            index,
            variants,
        })
    }

    /// Case-insensitive lookup by canonical name, variant or acronym.
    pub fn lookup(&self, token: &str) -> Option<&SkillEntry> {
        let key = token.trim().to_lowercase();
        self.index.get(&key).map(|&idx| &self.entries[idx])
    }

    /// All entries in table order.
    pub fn entries(&self) -> &[SkillEntry] {
        &self.entries
    }

    /// (variant, entry) pairs in registration order.
    pub fn variants(&self) -> impl Iterator<Item = (&str, &SkillEntry)> {
        self.variants
            .iter()
            .map(|(v, idx)| (v.as_str(), &self.entries[*idx]))
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.lookup(canonical)
            .is_some_and(|e| e.canonical == canonical.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn build_pattern(entry: &SkillEntry) -> Result<Option<Regex>, VocabularyError> {
    let mut spellings: Vec<&String> = entry
        .variants
        .iter()
        .chain(entry.acronyms.iter())
        .filter(|s| is_short_token_allowed(s))
        .collect();
    if spellings.is_empty() {
        return Ok(None);
    }
    // longest first so alternation prefers the most specific spelling
    spellings.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternation = spellings
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    let source = format!(r"(?i)(?:^|[^a-z0-9])(?:{alternation})(?:$|[^a-z0-9])");

    Regex::new(&source)
        .map(Some)
        .map_err(|source| VocabularyError::Pattern {
            canonical: entry.canonical.clone(),
            source,
        })
}
