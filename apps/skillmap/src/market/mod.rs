//! Market Model: per-cluster demand (size, skill frequency, ranked top skills
//! and the most common titles). Always rebuilt from the annotated postings.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Posting;

pub const DEFAULT_TOP_SKILLS: usize = 10;
pub const DEFAULT_TOP_TITLES: usize = 5;
pub const CORPUS_TOP_SKILLS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleCount {
    pub title: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub id: usize,
    pub size: usize,
    /// Member posting identifiers, in cluster order.
    pub members: Vec<String>,
    /// Skill → number of member postings requiring it.
    pub skill_frequency: BTreeMap<String, usize>,
    pub top_skills: Vec<SkillCount>,
    pub top_titles: Vec<TitleCount>,
}

impl ClusterProfile {
    /// Top skill names, most demanded first.
    pub fn top_skill_names(&self) -> Vec<String> {
        self.top_skills.iter().map(|s| s.skill.clone()).collect()
    }
}

/// Cluster id → profile for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketModel {
    clusters: BTreeMap<usize, ClusterProfile>,
}

impl MarketModel {
    /// Aggregates clustered postings. Postings still carrying the unclustered
    /// sentinel are ignored.
    pub fn aggregate(postings: &[Posting], top_skills: usize, top_titles: usize) -> Self {
        let mut members: BTreeMap<usize, Vec<&Posting>> = BTreeMap::new();
        for posting in postings {
            if let Ok(id) = usize::try_from(posting.cluster) {
                members.entry(id).or_default().push(posting);
            }
        }

        let clusters: BTreeMap<usize, ClusterProfile> = members
            .into_iter()
            .map(|(id, postings)| (id, profile(id, &postings, top_skills, top_titles)))
            .collect();

        info!("Market model built for {} clusters", clusters.len());
        Self { clusters }
    }

    pub fn get(&self, id: usize) -> Option<&ClusterProfile> {
        self.clusters.get(&id)
    }

    pub fn clusters(&self) -> impl Iterator<Item = &ClusterProfile> {
        self.clusters.values()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

fn profile(id: usize, postings: &[&Posting], top_skills: usize, top_titles: usize) -> ClusterProfile {
    let mut skill_frequency: BTreeMap<String, usize> = BTreeMap::new();
    let mut titles: HashMap<&str, usize> = HashMap::new();

    for posting in postings {
        let mut seen = BTreeSet::new();
        for skill in &posting.skills {
            let skill = skill.to_lowercase();
            if seen.insert(skill.clone()) {
                *skill_frequency.entry(skill).or_default() += 1;
            }
        }
        let title = posting.title.trim();
        if !title.is_empty() {
            *titles.entry(title).or_default() += 1;
        }
    }

    ClusterProfile {
        id,
        size: postings.len(),
        members: postings.iter().map(|p| p.id.clone()).collect(),
        top_skills: rank_skills(&skill_frequency, top_skills),
        top_titles: rank(titles.into_iter().map(|(t, c)| (t.to_string(), c)).collect(), top_titles)
            .into_iter()
            .map(|(title, count)| TitleCount { title, count })
            .collect(),
        skill_frequency,
    }
}

/// Descending count, ties by name.
fn rank(mut counts: Vec<(String, usize)>, limit: usize) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(limit);
    counts
}

fn rank_skills(frequency: &BTreeMap<String, usize>, limit: usize) -> Vec<SkillCount> {
    rank(
        frequency.iter().map(|(s, c)| (s.clone(), *c)).collect(),
        limit,
    )
    .into_iter()
    .map(|(skill, count)| SkillCount { skill, count })
    .collect()
}

/// Corpus-wide extraction summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_postings: usize,
    pub postings_with_skills: usize,
    pub unique_skills: usize,
    pub top_skills: Vec<SkillCount>,
}

impl CorpusStats {
    pub fn from_postings(postings: &[Posting]) -> Self {
        let mut frequency: BTreeMap<String, usize> = BTreeMap::new();
        for posting in postings {
            for skill in &posting.skills {
                *frequency.entry(skill.to_lowercase()).or_default() += 1;
            }
        }

        Self {
            total_postings: postings.len(),
            postings_with_skills: postings.iter().filter(|p| !p.skills.is_empty()).count(),
            unique_skills: frequency.len(),
            top_skills: rank_skills(&frequency, CORPUS_TOP_SKILLS),
        }
    }
}
