use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A person whose skills are compared against a job family.
/// Skills are stored lowercase and trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CandidateInput")]
pub struct CandidateProfile {
    pub name: String,
    pub skills: BTreeSet<String>,
    /// Cluster to analyze against; the best-aligned cluster is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_cluster: Option<usize>,
}

#[derive(Deserialize)]
struct CandidateInput {
    name: String,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    target_cluster: Option<usize>,
}

impl From<CandidateInput> for CandidateProfile {
    fn from(input: CandidateInput) -> Self {
        let mut profile = CandidateProfile::new(input.name, input.skills);
        profile.target_cluster = input.target_cluster;
        profile
    }
}

impl CandidateProfile {
    pub fn new<I, S>(name: impl Into<String>, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            skills: normalize_skills(skills),
            target_cluster: None,
        }
    }

    pub fn targeting(mut self, cluster_id: usize) -> Self {
        self.target_cluster = Some(cluster_id);
        self
    }
}

/// Lowercases, trims and deduplicates a skill list; empty entries are dropped.
pub fn normalize_skills<I, S>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_normalized_on_construction() {
        let profile = CandidateProfile::new("amina", ["Python", " SQL ", "python", ""]);
        assert_eq!(
            profile.skills.iter().cloned().collect::<Vec<_>>(),
            vec!["python".to_string(), "sql".to_string()]
        );
    }

    #[test]
    fn test_deserialize_normalizes_skills() {
        let profile: CandidateProfile = serde_json::from_str(
            r#"{"name": "yassine", "skills": ["Docker", "AWS"], "target_cluster": 2}"#,
        )
        .unwrap();
        assert!(profile.skills.contains("docker"));
        assert!(profile.skills.contains("aws"));
        assert_eq!(profile.target_cluster, Some(2));
    }

    #[test]
    fn test_missing_skills_defaults_to_empty() {
        let profile: CandidateProfile = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(profile.skills.is_empty());
        assert!(profile.target_cluster.is_none());
    }
}
