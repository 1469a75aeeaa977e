//! Archetype recommendations: what a predefined role should learn next,
//! anchored on the cluster that best matches its core skills.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::market::{ClusterProfile, MarketModel};
use crate::recommendation::gap::best_cluster_for;
use crate::vocabulary::SkillVocabulary;

/// Skills that get a priority boost when they appear in a recommendation.
pub const ESSENTIAL_KEYWORDS: &[&str] = &["docker", "kubernetes", "aws", "git", "api"];
pub const ESSENTIAL_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_RECOMMENDATIONS: usize = 10;

/// A predefined role template. Core skills are canonical vocabulary names.
#[derive(Debug, Clone, Serialize)]
pub struct Archetype {
    pub name: &'static str,
    pub family: &'static str,
    pub core_skills: &'static [&'static str],
}

impl Archetype {
    pub fn core_set(&self) -> BTreeSet<String> {
        self.core_skills.iter().map(|s| s.to_string()).collect()
    }
}

pub const ARCHETYPES: &[Archetype] = &[
    Archetype {
        name: "data_engineer",
        family: "Data",
        core_skills: &["python", "sql", "spark", "docker", "aws"],
    },
    Archetype {
        name: "backend_dev",
        family: "Backend",
        core_skills: &["javascript", "node.js", "sql", "docker", "rest api"],
    },
    Archetype {
        name: "devops_engineer",
        family: "DevOps",
        core_skills: &["docker", "kubernetes", "continuous integration", "aws", "terraform"],
    },
    Archetype {
        name: "ml_engineer",
        family: "AI/ML",
        core_skills: &["python", "tensorflow", "pytorch", "sql", "natural language processing"],
    },
    Archetype {
        name: "frontend_dev",
        family: "Frontend",
        core_skills: &["javascript", "typescript", "react", "html", "css"],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecommendation {
    pub skill: String,
    pub frequency: usize,
    /// Share of the cluster's postings requiring the skill.
    pub importance_score: f64,
    pub priority: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPhase {
    pub phase: String,
    pub skills: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeReport {
    pub profile: String,
    pub family: String,
    pub cluster: usize,
    pub current_skills: Vec<String>,
    pub recommended_skills: Vec<SkillRecommendation>,
    pub matching_postings: usize,
    pub learning_path: Vec<PathPhase>,
}

pub fn priority(skill: &str, frequency: usize) -> f64 {
    let skill = skill.to_lowercase();
    let base = frequency as f64;
    if ESSENTIAL_KEYWORDS.iter().any(|k| skill.contains(k)) {
        base * ESSENTIAL_MULTIPLIER
    } else {
        base
    }
}

/// Ranks the cluster's skills outside `core_skills`, most valuable first.
/// Returns the capped recommendation list and its three-phase path.
pub fn recommend_for_archetype(
    core_skills: &BTreeSet<String>,
    cluster: &ClusterProfile,
    top_n: usize,
) -> (Vec<SkillRecommendation>, Vec<PathPhase>) {
    let mut by_frequency: Vec<(&String, usize)> =
        cluster.skill_frequency.iter().map(|(s, c)| (s, *c)).collect();
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut recommendations: Vec<SkillRecommendation> = by_frequency
        .into_iter()
        .take(top_n * 2)
        .filter(|(skill, _)| !core_skills.contains(*skill))
        .map(|(skill, frequency)| SkillRecommendation {
            skill: skill.clone(),
            frequency,
            importance_score: if cluster.size == 0 {
                0.0
            } else {
                frequency as f64 / cluster.size as f64
            },
            priority: priority(skill, frequency),
        })
        .collect();
    recommendations.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
    recommendations.truncate(top_n);

    let path = archetype_learning_path(&recommendations);
    (recommendations, path)
}

/// Roughly equal thirds; empty phases are dropped.
fn archetype_learning_path(recommendations: &[SkillRecommendation]) -> Vec<PathPhase> {
    if recommendations.is_empty() {
        return Vec::new();
    }
    let n = recommendations.len();
    let first = (n / 3).max(1);
    let second = n.saturating_sub(first * 2);

    let names: Vec<String> = recommendations.iter().map(|r| r.skill.clone()).collect();
    let (phase1, rest) = names.split_at(first);
    let (phase2, phase3) = rest.split_at(second.min(rest.len()));

    [
        ("Foundations (0-3 months)", phase1, "Master the essentials of the role"),
        ("Specialization (3-6 months)", phase2, "Deepen the key skills of the domain"),
        ("Advanced (6+ months)", phase3, "Take on advanced and specialized technologies"),
    ]
    .into_iter()
    .filter(|(_, skills, _)| !skills.is_empty())
    .map(|(phase, skills, description)| PathPhase {
        phase: phase.to_string(),
        skills: skills.to_vec(),
        description: description.to_string(),
    })
    .collect()
}

/// Archetype table checked against a vocabulary.
#[derive(Debug, Clone)]
pub struct Recommender {
    archetypes: Vec<Archetype>,
}

impl Recommender {
    pub fn builtin(vocabulary: &SkillVocabulary) -> Result<Self, AppError> {
        Self::new(ARCHETYPES.to_vec(), vocabulary)
    }

    /// Fails on any core skill the vocabulary does not know.
    pub fn new(archetypes: Vec<Archetype>, vocabulary: &SkillVocabulary) -> Result<Self, AppError> {
        for archetype in &archetypes {
            if let Some(unknown) = archetype
                .core_skills
                .iter()
                .find(|skill| !vocabulary.contains(skill))
            {
                return Err(AppError::Config(format!(
                    "archetype '{}' lists unknown skill '{}'",
                    archetype.name, unknown
                )));
            }
        }
        info!("Archetype registry loaded: {} archetypes", archetypes.len());
        Ok(Self { archetypes })
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn get(&self, name: &str) -> Result<&Archetype, AppError> {
        self.archetypes
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| AppError::UnknownArchetype(name.to_string()))
    }

    pub fn recommend(&self, name: &str, market: &MarketModel, top_n: usize) -> Result<ArchetypeReport, AppError> {
        let archetype = self.get(name)?;
        let core = archetype.core_set();
        let cluster_id = best_cluster_for(&core, market).ok_or(AppError::NoClusters)?;
        let cluster = market.get(cluster_id).ok_or(AppError::UnknownCluster(cluster_id))?;

        let (recommended_skills, learning_path) = recommend_for_archetype(&core, cluster, top_n);
        info!(
            "Archetype {}: cluster {} ({} postings), {} recommendations",
            archetype.name,
            cluster.id,
            cluster.size,
            recommended_skills.len()
        );

        Ok(ArchetypeReport {
            profile: archetype.name.to_string(),
            family: archetype.family.to_string(),
            cluster: cluster.id,
            current_skills: core.into_iter().collect(),
            recommended_skills,
            matching_postings: cluster.size,
            learning_path,
        })
    }

    pub fn recommend_all(
        &self,
        market: &MarketModel,
        top_n: usize,
    ) -> Result<BTreeMap<String, ArchetypeReport>, AppError> {
        self.archetypes
            .iter()
            .map(|a| Ok((a.name.to_string(), self.recommend(a.name, market, top_n)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Posting;

    fn vocabulary() -> SkillVocabulary {
        SkillVocabulary::builtin().unwrap()
    }

    fn cluster(frequency: &[(&str, usize)], size: usize) -> ClusterProfile {
        ClusterProfile {
            id: 0,
            size,
            members: Vec::new(),
            skill_frequency: frequency.iter().map(|(s, c)| (s.to_string(), *c)).collect(),
            top_skills: Vec::new(),
            top_titles: Vec::new(),
        }
    }

    fn market() -> MarketModel {
        let mut postings = vec![
            Posting::with_skills("1", "Data Engineer", &["python", "sql", "spark", "airflow"]),
            Posting::with_skills("2", "Data Engineer", &["python", "sql", "kafka", "docker"]),
            Posting::with_skills("3", "Frontend", &["javascript", "react", "css", "git"]),
        ];
        postings[0].cluster = 0;
        postings[1].cluster = 0;
        postings[2].cluster = 1;
        MarketModel::aggregate(&postings, 10, 5)
    }

    #[test]
    fn test_builtin_archetypes_match_vocabulary() {
        let recommender = Recommender::builtin(&vocabulary()).unwrap();
        assert_eq!(recommender.archetypes().len(), 5);
    }

    #[test]
    fn test_unknown_core_skill_rejected() {
        let bad = vec![Archetype {
            name: "wizard",
            family: "Magic",
            core_skills: &["spellcasting"],
        }];
        let err = Recommender::new(bad, &vocabulary()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_unknown_archetype_name() {
        let recommender = Recommender::builtin(&vocabulary()).unwrap();
        let err = recommender.recommend("astronaut", &market(), 5).unwrap_err();
        assert!(matches!(err, AppError::UnknownArchetype(name) if name == "astronaut"));
    }

    #[test]
    fn test_core_skills_excluded_and_essentials_boosted() {
        let core: BTreeSet<String> = ["python".to_string()].into_iter().collect();
        let profile = cluster(&[("python", 10), ("scala", 6), ("docker", 5), ("sql", 4)], 10);
        let (recs, _) = recommend_for_archetype(&core, &profile, 5);

        let names: Vec<&str> = recs.iter().map(|r| r.skill.as_str()).collect();
        // docker 5 * 1.5 = 7.5 outranks scala 6
        assert_eq!(names, vec!["docker", "scala", "sql"]);
        assert_eq!(recs[0].priority, 7.5);
        assert_eq!(recs[1].importance_score, 0.6);
    }

    #[test]
    fn test_recommendations_capped() {
        let core = BTreeSet::new();
        let profile = cluster(&[("a1", 5), ("a2", 4), ("a3", 3), ("a4", 2)], 5);
        let (recs, _) = recommend_for_archetype(&core, &profile, 2);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_learning_path_thirds() {
        let core = BTreeSet::new();
        let freq: Vec<(String, usize)> = (0..7).map(|i| (format!("s{i}"), 10 - i)).collect();
        let refs: Vec<(&str, usize)> = freq.iter().map(|(s, c)| (s.as_str(), *c)).collect();
        let (_, path) = recommend_for_archetype(&core, &cluster(&refs, 10), 7);
        let sizes: Vec<usize> = path.iter().map(|p| p.skills.len()).collect();
        assert_eq!(sizes, vec![2, 3, 2]);
    }

    #[test]
    fn test_single_recommendation_path() {
        let core = BTreeSet::new();
        let (_, path) = recommend_for_archetype(&core, &cluster(&[("rust", 1)], 1), 5);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].skills, vec!["rust"]);
    }

    #[test]
    fn test_empty_cluster_gives_empty_path() {
        let (recs, path) = recommend_for_archetype(&BTreeSet::new(), &cluster(&[], 0), 5);
        assert!(recs.is_empty());
        assert!(path.is_empty());
    }

    #[test]
    fn test_archetype_anchored_on_best_cluster() {
        let recommender = Recommender::builtin(&vocabulary()).unwrap();
        let market = market();

        let data = recommender.recommend("data_engineer", &market, 5).unwrap();
        assert_eq!(data.cluster, 0);
        assert_eq!(data.matching_postings, 2);
        assert!(data.recommended_skills.iter().all(|r| r.skill != "python"));

        let front = recommender.recommend("frontend_dev", &market, 5).unwrap();
        assert_eq!(front.cluster, 1);
        assert_eq!(front.recommended_skills[0].skill, "git");
    }

    #[test]
    fn test_recommend_all_covers_every_archetype() {
        let recommender = Recommender::builtin(&vocabulary()).unwrap();
        let all = recommender.recommend_all(&market(), 5).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.contains_key("ml_engineer"));
    }

    #[test]
    fn test_recommend_on_empty_market() {
        let recommender = Recommender::builtin(&vocabulary()).unwrap();
        let err = recommender
            .recommend("backend_dev", &MarketModel::default(), 5)
            .unwrap_err();
        assert!(matches!(err, AppError::NoClusters));
    }
}
