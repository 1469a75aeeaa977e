//! Gap Analyzer: compares a candidate's skills with a cluster's most demanded
//! skills and turns the difference into priorities, quick wins and a phased
//! learning path.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::market::{ClusterProfile, MarketModel, SkillCount};
use crate::models::CandidateProfile;

/// Tools and frameworks that are usually quick to pick up.
pub const QUICK_WIN_KEYWORDS: &[&str] = &[
    "git", "docker", "pytest", "jenkins", "webpack", "terraform", "ansible", "graphql", "rest",
    "oauth",
];

pub const MAX_QUICK_WINS: usize = 5;
pub const REPORT_PRIORITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
}

impl PriorityLevel {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0..=2 => PriorityLevel::Critical,
            3..=5 => PriorityLevel::High,
            _ => PriorityLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Critical => "CRITICAL",
            PriorityLevel::High => "HIGH",
            PriorityLevel::Medium => "MEDIUM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPriority {
    pub skill: String,
    pub level: PriorityLevel,
    pub frequency: usize,
    /// 0-based position among the missing skills, most demanded first.
    pub rank: usize,
    pub impact_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickWin {
    pub skill: String,
    pub effort: String,
    pub learning_time: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPhase {
    pub phase: String,
    pub duration: String,
    pub skills: Vec<String>,
    pub description: String,
    pub resources: Vec<String>,
}

struct PhaseTemplate {
    phase: &'static str,
    duration: &'static str,
    cap: usize,
    description: &'static str,
    resources: &'static [&'static str],
}

const GAP_PHASES: &[PhaseTemplate] = &[
    PhaseTemplate {
        phase: "immediate",
        duration: "1-2 months",
        cap: 2,
        description: "Master critical skills for immediate job market fit",
        resources: &["Online courses", "GitHub projects", "Documentation"],
    },
    PhaseTemplate {
        phase: "consolidation",
        duration: "2-4 months",
        cap: 3,
        description: "Build expertise in core domain skills",
        resources: &["Advanced courses", "Real projects", "Mentoring"],
    },
    PhaseTemplate {
        phase: "specialization",
        duration: "4-6 months",
        cap: 3,
        description: "Develop specialized skills for advanced roles",
        resources: &["Certifications", "Research papers", "Open source"],
    },
];

/// Candidate vs cluster comparison.
///
/// `mastered` and `missing` partition the cluster's top skills and keep their
/// demand order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub mastered: Vec<String>,
    pub missing: Vec<String>,
    pub gap_percentage: f64,
    pub priorities: Vec<SkillPriority>,
    pub quick_wins: Vec<QuickWin>,
    pub learning_path: Vec<LearningPhase>,
}

/// Gap analysis addressed to a candidate and a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub candidate: String,
    pub target_cluster: usize,
    #[serde(flatten)]
    pub analysis: GapAnalysis,
}

pub fn impact_score(rank: usize) -> f64 {
    100.0_f64 - (rank as f64) * 5.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compares `candidate_skills` with a frequency-ranked top-skill list.
///
/// Missing skills are ranked in demand order after removing what the candidate
/// already has, so the most demanded missing skill always scores 100.
pub fn analyze_gap(candidate_skills: &BTreeSet<String>, cluster_top_skills: &[SkillCount]) -> GapAnalysis {
    let mut seen = BTreeSet::new();
    let ranked: Vec<&SkillCount> = cluster_top_skills
        .iter()
        .filter(|s| seen.insert(s.skill.to_lowercase()))
        .collect();

    let (mastered, missing): (Vec<&SkillCount>, Vec<&SkillCount>) = ranked
        .iter()
        .copied()
        .partition(|s| candidate_skills.contains(&s.skill.to_lowercase()));

    let gap_percentage = if ranked.is_empty() {
        0.0
    } else {
        round1(missing.len() as f64 / ranked.len() as f64 * 100.0)
    };

    let mut priorities: Vec<SkillPriority> = missing
        .iter()
        .enumerate()
        .map(|(rank, s)| SkillPriority {
            skill: s.skill.clone(),
            level: PriorityLevel::for_rank(rank),
            frequency: s.count,
            rank,
            impact_score: impact_score(rank).max(0.0),
        })
        .collect();
    priorities.sort_by(|a, b| {
        b.impact_score
            .partial_cmp(&a.impact_score)
            .unwrap_or(Ordering::Equal)
    });

    let quick_wins = missing
        .iter()
        .filter(|s| is_quick_win(&s.skill))
        .take(MAX_QUICK_WINS)
        .map(|s| QuickWin {
            skill: s.skill.clone(),
            effort: "Low".to_string(),
            learning_time: "2-4 weeks".to_string(),
            frequency: s.count,
        })
        .collect();

    let missing: Vec<String> = missing.iter().map(|s| s.skill.clone()).collect();

    GapAnalysis {
        mastered: mastered.iter().map(|s| s.skill.clone()).collect(),
        learning_path: gap_learning_path(&missing),
        missing,
        gap_percentage,
        priorities,
        quick_wins,
    }
}

pub fn is_quick_win(skill: &str) -> bool {
    let skill = skill.to_lowercase();
    QUICK_WIN_KEYWORDS.iter().any(|k| skill.contains(k))
}

/// Fills the three fixed phases in demand order; skills past the caps are left out.
fn gap_learning_path(missing: &[String]) -> Vec<LearningPhase> {
    let mut remaining = missing.iter();
    GAP_PHASES
        .iter()
        .map(|template| LearningPhase {
            phase: template.phase.to_string(),
            duration: template.duration.to_string(),
            skills: remaining.by_ref().take(template.cap).cloned().collect(),
            description: template.description.to_string(),
            resources: template.resources.iter().map(|r| r.to_string()).collect(),
        })
        .collect()
}

/// Share of the cluster's top skills the candidate already has, in percent.
pub fn alignment(skills: &BTreeSet<String>, cluster_top_skills: &[SkillCount]) -> f64 {
    let top: BTreeSet<String> = cluster_top_skills
        .iter()
        .map(|s| s.skill.to_lowercase())
        .collect();
    if top.is_empty() {
        return 0.0;
    }
    let mastered = top.iter().filter(|s| skills.contains(*s)).count();
    round1(mastered as f64 / top.len() as f64 * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAlignment {
    pub name: String,
    pub mastered_count: usize,
    pub missing_count: usize,
    pub alignment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileComparison {
    /// Highest alignment first; equal alignments keep input order.
    pub ranking: Vec<ProfileAlignment>,
    pub best_match: Option<String>,
    pub worst_match: Option<String>,
}

pub fn compare_profiles(profiles: &[CandidateProfile], cluster_top_skills: &[SkillCount]) -> ProfileComparison {
    let mut ranking: Vec<ProfileAlignment> = profiles
        .iter()
        .map(|profile| {
            let analysis = analyze_gap(&profile.skills, cluster_top_skills);
            ProfileAlignment {
                name: profile.name.clone(),
                mastered_count: analysis.mastered.len(),
                missing_count: analysis.missing.len(),
                alignment: alignment(&profile.skills, cluster_top_skills),
            }
        })
        .collect();
    ranking.sort_by(|a, b| b.alignment.partial_cmp(&a.alignment).unwrap_or(Ordering::Equal));

    ProfileComparison {
        best_match: ranking.first().map(|p| p.name.clone()),
        worst_match: ranking.last().map(|p| p.name.clone()),
        ranking,
    }
}

/// Cluster with the highest alignment; ties go to the larger cluster, then the lower id.
pub fn best_cluster_for(skills: &BTreeSet<String>, market: &MarketModel) -> Option<usize> {
    market
        .clusters()
        .map(|cluster| (alignment(skills, &cluster.top_skills), cluster))
        .max_by(|(a, ca), (b, cb)| {
            a.partial_cmp(b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ca.size.cmp(&cb.size))
                .then_with(|| cb.id.cmp(&ca.id))
        })
        .map(|(_, cluster)| cluster.id)
}

/// Resolves the candidate's cluster (explicit target, else best aligned).
pub fn target_cluster<'a>(
    candidate: &CandidateProfile,
    market: &'a MarketModel,
) -> Result<&'a ClusterProfile, AppError> {
    let id = match candidate.target_cluster {
        Some(id) => id,
        None => best_cluster_for(&candidate.skills, market).ok_or(AppError::NoClusters)?,
    };
    market.get(id).ok_or(AppError::UnknownCluster(id))
}

/// Full report for one candidate against the market.
pub fn analyze_candidate(candidate: &CandidateProfile, market: &MarketModel) -> Result<GapReport, AppError> {
    let cluster = target_cluster(candidate, market)?;
    Ok(GapReport {
        candidate: candidate.name.clone(),
        target_cluster: cluster.id,
        analysis: analyze_gap(&candidate.skills, &cluster.top_skills),
    })
}

/// Plain-text summary of a report.
pub fn render_gap_report(report: &GapReport) -> String {
    let rule = "=".repeat(60);
    let analysis = &report.analysis;
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "SKILL GAP ANALYSIS - {} (cluster {})", report.candidate, report.target_cluster);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);
    let _ = writeln!(out, "OVERVIEW");
    let _ = writeln!(out, "Mastered skills: {}", analysis.mastered.len());
    let _ = writeln!(out, "Missing skills: {}", analysis.missing.len());
    let _ = writeln!(out, "Gap: {:.1}%", analysis.gap_percentage);
    let _ = writeln!(out);
    let _ = writeln!(out, "MASTERED SKILLS");
    if analysis.mastered.is_empty() {
        let _ = writeln!(out, "None");
    } else {
        let _ = writeln!(out, "{}", analysis.mastered.join(", "));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "MISSING SKILLS (PRIORITY ORDER)");
    for priority in analysis.priorities.iter().take(REPORT_PRIORITY_LIMIT) {
        let _ = writeln!(
            out,
            "{}: {} (Impact: {:.1})",
            priority.level.as_str(),
            priority.skill,
            priority.impact_score
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "QUICK WINS");
    for win in &analysis.quick_wins {
        let _ = writeln!(out, "- {} ({}, {})", win.skill, win.effort, win.learning_time);
    }
    let _ = write!(out, "{rule}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Posting;

    fn top(skills: &[(&str, usize)]) -> Vec<SkillCount> {
        skills
            .iter()
            .map(|(skill, count)| SkillCount {
                skill: skill.to_string(),
                count: *count,
            })
            .collect()
    }

    fn skills(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn backend_top() -> Vec<SkillCount> {
        top(&[("python", 10), ("docker", 8), ("aws", 6), ("kubernetes", 5)])
    }

    #[test]
    fn test_gap_against_ranked_cluster() {
        let gap = analyze_gap(&skills(&["python", "sql"]), &backend_top());
        assert_eq!(gap.mastered, vec!["python"]);
        assert_eq!(gap.missing, vec!["docker", "aws", "kubernetes"]);
        assert_eq!(gap.gap_percentage, 75.0);

        let levels: Vec<PriorityLevel> = gap.priorities.iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![PriorityLevel::Critical; 3]);
        let impacts: Vec<f64> = gap.priorities.iter().map(|p| p.impact_score).collect();
        assert_eq!(impacts, vec![100.0, 95.0, 90.0]);
        assert_eq!(gap.priorities[0].skill, "docker");
        assert_eq!(gap.priorities[0].frequency, 8);
    }

    #[test]
    fn test_impact_follows_rank() {
        let gap = analyze_gap(&skills(&[]), &backend_top());
        let impacts: Vec<f64> = gap.priorities.iter().map(|p| p.impact_score).collect();
        assert_eq!(impacts, vec![100.0, 95.0, 90.0, 85.0]);
        assert_eq!(gap.gap_percentage, 100.0);
    }

    #[test]
    fn test_levels_by_rank() {
        assert_eq!(PriorityLevel::for_rank(0), PriorityLevel::Critical);
        assert_eq!(PriorityLevel::for_rank(2), PriorityLevel::Critical);
        assert_eq!(PriorityLevel::for_rank(3), PriorityLevel::High);
        assert_eq!(PriorityLevel::for_rank(5), PriorityLevel::High);
        assert_eq!(PriorityLevel::for_rank(6), PriorityLevel::Medium);
    }

    #[test]
    fn test_impact_never_negative() {
        let many: Vec<(String, usize)> = (0..25).map(|i| (format!("skill{i}"), 25 - i)).collect();
        let ranked: Vec<SkillCount> = many
            .into_iter()
            .map(|(skill, count)| SkillCount { skill, count })
            .collect();
        let gap = analyze_gap(&skills(&[]), &ranked);
        assert!(gap.priorities.iter().all(|p| p.impact_score >= 0.0));
        assert_eq!(gap.priorities.last().unwrap().impact_score, 0.0);
    }

    #[test]
    fn test_mastered_and_missing_partition_top_skills() {
        let ranked = backend_top();
        let gap = analyze_gap(&skills(&["aws", "docker", "rust"]), &ranked);
        let union: BTreeSet<&String> = gap.mastered.iter().chain(gap.missing.iter()).collect();
        assert_eq!(union.len(), ranked.len());
        assert!(gap.mastered.iter().all(|s| !gap.missing.contains(s)));
        assert!((0.0..=100.0).contains(&gap.gap_percentage));
    }

    #[test]
    fn test_empty_cluster_has_zero_gap() {
        let gap = analyze_gap(&skills(&["python"]), &[]);
        assert_eq!(gap.gap_percentage, 0.0);
        assert!(gap.missing.is_empty());
        assert!(gap.priorities.is_empty());
    }

    #[test]
    fn test_quick_wins_capped_and_annotated() {
        let ranked = top(&[
            ("git", 9),
            ("docker", 8),
            ("terraform", 7),
            ("graphql", 6),
            ("ansible", 5),
            ("jenkins", 4),
            ("scala", 3),
        ]);
        let gap = analyze_gap(&skills(&[]), &ranked);
        assert_eq!(gap.quick_wins.len(), MAX_QUICK_WINS);
        assert!(gap.quick_wins.iter().all(|w| w.effort == "Low" && w.learning_time == "2-4 weeks"));
        assert_eq!(gap.quick_wins[0].skill, "git");
        assert_eq!(gap.quick_wins[0].frequency, 9);
        assert!(!gap.quick_wins.iter().any(|w| w.skill == "scala"));
    }

    #[test]
    fn test_learning_path_phases_capped() {
        let ranked: Vec<SkillCount> = (0..10)
            .map(|i| SkillCount {
                skill: format!("s{i}"),
                count: 10 - i,
            })
            .collect();
        let gap = analyze_gap(&skills(&[]), &ranked);
        let sizes: Vec<usize> = gap.learning_path.iter().map(|p| p.skills.len()).collect();
        assert_eq!(sizes, vec![2, 3, 3]);
        assert_eq!(gap.learning_path[0].skills, vec!["s0", "s1"]);
        assert_eq!(gap.learning_path[0].duration, "1-2 months");
        assert_eq!(gap.learning_path[2].duration, "4-6 months");
    }

    #[test]
    fn test_compare_profiles_ranks_by_alignment() {
        let profiles = vec![
            CandidateProfile::new("novice", ["html"]),
            CandidateProfile::new("expert", ["python", "docker", "aws"]),
            CandidateProfile::new("middle", ["python"]),
        ];
        let comparison = compare_profiles(&profiles, &backend_top());
        let names: Vec<&str> = comparison.ranking.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["expert", "middle", "novice"]);
        assert_eq!(comparison.ranking[0].alignment, 75.0);
        assert_eq!(comparison.best_match.as_deref(), Some("expert"));
        assert_eq!(comparison.worst_match.as_deref(), Some("novice"));
    }

    #[test]
    fn test_compare_no_profiles() {
        let comparison = compare_profiles(&[], &backend_top());
        assert!(comparison.ranking.is_empty());
        assert!(comparison.best_match.is_none());
    }

    fn market() -> MarketModel {
        let mut postings = vec![
            Posting::with_skills("1", "Data Engineer", &["python", "sql", "spark"]),
            Posting::with_skills("2", "Data Engineer", &["python", "sql"]),
            Posting::with_skills("3", "Frontend", &["react", "css"]),
        ];
        postings[0].cluster = 0;
        postings[1].cluster = 0;
        postings[2].cluster = 1;
        MarketModel::aggregate(&postings, 10, 5)
    }

    #[test]
    fn test_best_cluster_by_alignment() {
        let market = market();
        assert_eq!(best_cluster_for(&skills(&["react"]), &market), Some(1));
        assert_eq!(best_cluster_for(&skills(&["python"]), &market), Some(0));
        // no overlap anywhere: larger cluster wins
        assert_eq!(best_cluster_for(&skills(&["cobol"]), &market), Some(0));
        assert_eq!(best_cluster_for(&skills(&["python"]), &MarketModel::default()), None);
    }

    #[test]
    fn test_analyze_candidate_uses_explicit_target() {
        let market = market();
        let candidate = CandidateProfile::new("lina", ["python"]).targeting(1);
        let report = analyze_candidate(&candidate, &market).unwrap();
        assert_eq!(report.target_cluster, 1);
        assert_eq!(report.analysis.gap_percentage, 100.0);
    }

    #[test]
    fn test_analyze_candidate_unknown_cluster() {
        let candidate = CandidateProfile::new("lina", ["python"]).targeting(9);
        let err = analyze_candidate(&candidate, &market()).unwrap_err();
        assert!(matches!(err, AppError::UnknownCluster(9)));
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = analyze_candidate(&CandidateProfile::new("omar", ["python"]), &market()).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["candidate"], "omar");
        assert_eq!(value["target_cluster"], 0);
        assert!(value["gap_percentage"].is_number());
        assert_eq!(value["priorities"][0]["level"], "CRITICAL");
    }

    #[test]
    fn test_render_text_report() {
        let report = GapReport {
            candidate: "sara".to_string(),
            target_cluster: 2,
            analysis: analyze_gap(&skills(&["python"]), &backend_top()),
        };
        let text = render_gap_report(&report);
        assert!(text.contains("SKILL GAP ANALYSIS - sara (cluster 2)"));
        assert!(text.contains("Gap: 75.0%"));
        assert!(text.contains("CRITICAL: docker (Impact: 100.0)"));
        assert!(text.contains("- docker (Low, 2-4 weeks)"));
    }
}
