//! Similarity Clustering Engine: greedy average-linkage merge of postings
//! into job families.
//!
//! Every posting starts as a singleton. Each iteration performs at most one
//! merge: the absorbing cluster keeps the lower id and appends the other
//! cluster's members after its own. The loop stops when no pair reaches the
//! threshold or after `max_iterations` merges, whichever comes first. Surviving
//! ids are then renumbered densely in id order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clustering::similarity::{average_linkage, skill_set, SkillSet};
use crate::models::{Posting, UNCLUSTERED};

pub const DEFAULT_MIN_SIMILARITY: f64 = 0.25;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Cluster id → member posting indices.
pub type Clusters = BTreeMap<usize, Vec<usize>>;

/// Which qualifying pair is merged in an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// First pair in id order at or above the threshold.
    #[default]
    FirstFound,
    /// Highest average similarity; ties go to the lowest id pair.
    BestPair,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::FirstFound => write!(f, "first_found"),
            MergeStrategy::BestPair => write!(f, "best_pair"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first_found" => Ok(MergeStrategy::FirstFound),
            "best_pair" => Ok(MergeStrategy::BestPair),
            other => Err(format!(
                "unknown merge strategy '{other}' (expected first_found or best_pair)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterOptions {
    pub min_similarity: f64,
    pub max_iterations: usize,
    pub strategy: MergeStrategy,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            strategy: MergeStrategy::default(),
        }
    }
}

/// Threshold used for a corpus of `n` postings. Small corpora get a
/// proportionally lower threshold, never below half of `base`.
pub fn effective_threshold(n: usize, base: f64, min_corpus: usize) -> f64 {
    if min_corpus == 0 || n >= min_corpus {
        return base;
    }
    base * (0.5 + 0.5 * n as f64 / min_corpus as f64)
}

/// Clusters postings by their extracted skills.
pub fn cluster_postings(postings: &[Posting], options: &ClusterOptions) -> Clusters {
    let sets: Vec<SkillSet> = postings.iter().map(|p| skill_set(&p.skills)).collect();
    cluster(&sets, options)
}

/// Clusters skill sets. The result partitions `0..sets.len()`.
pub fn cluster(sets: &[SkillSet], options: &ClusterOptions) -> Clusters {
    let mut clusters: Clusters = (0..sets.len()).map(|i| (i, vec![i])).collect();
    let mut merges = 0;

    while merges < options.max_iterations {
        let candidate = match options.strategy {
            MergeStrategy::FirstFound => first_qualifying_pair(&clusters, sets, options.min_similarity),
            MergeStrategy::BestPair => best_qualifying_pair(&clusters, sets, options.min_similarity),
        };
        let Some((keep, absorb, similarity)) = candidate else {
            break;
        };

        if let Some(members) = clusters.remove(&absorb) {
            if let Some(target) = clusters.get_mut(&keep) {
                target.extend(members);
            }
        }
        merges += 1;
        debug!(
            "Merged cluster {} into {} (avg similarity {:.3})",
            absorb, keep, similarity
        );
    }

    if merges == options.max_iterations && merges > 0 {
        debug!("Merge bound of {} reached", options.max_iterations);
    }

    let dense: Clusters = clusters
        .into_values()
        .enumerate()
        .collect();

    info!(
        "Clustered {} postings into {} clusters ({} merges, threshold {:.3}, {})",
        sets.len(),
        dense.len(),
        merges,
        options.min_similarity,
        options.strategy
    );
    dense
}

fn qualifies(similarity: f64, threshold: f64) -> bool {
    similarity > 0.0 && similarity >= threshold
}

fn first_qualifying_pair(
    clusters: &Clusters,
    sets: &[SkillSet],
    threshold: f64,
) -> Option<(usize, usize, f64)> {
    let ids: Vec<&usize> = clusters.keys().collect();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let similarity = average_linkage(&clusters[a], &clusters[b], sets);
            if qualifies(similarity, threshold) {
                return Some((*a, *b, similarity));
            }
        }
    }
    None
}

fn best_qualifying_pair(
    clusters: &Clusters,
    sets: &[SkillSet],
    threshold: f64,
) -> Option<(usize, usize, f64)> {
    let ids: Vec<&usize> = clusters.keys().collect();
    let mut best: Option<(usize, usize, f64)> = None;
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let similarity = average_linkage(&clusters[a], &clusters[b], sets);
            if !qualifies(similarity, threshold) {
                continue;
            }
            if best.map_or(true, |(_, _, s)| similarity > s) {
                best = Some((*a, *b, similarity));
            }
        }
    }
    best
}

/// Cluster id per posting index; indices not covered get `UNCLUSTERED`.
pub fn assign_clusters(n: usize, clusters: &Clusters) -> Vec<i64> {
    let mut assignment = vec![UNCLUSTERED; n];
    for (&id, members) in clusters {
        for &idx in members {
            if idx < n {
                assignment[idx] = id as i64;
            }
        }
    }
    assignment
}

/// Writes cluster ids back onto the postings.
pub fn apply_clusters(postings: &mut [Posting], clusters: &Clusters) {
    let assignment = assign_clusters(postings.len(), clusters);
    for (posting, id) in postings.iter_mut().zip(assignment) {
        posting.cluster = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(raw: &[&[&str]]) -> Vec<SkillSet> {
        raw.iter().map(|s| skill_set(s.iter())).collect()
    }

    fn options(min_similarity: f64) -> ClusterOptions {
        ClusterOptions {
            min_similarity,
            ..ClusterOptions::default()
        }
    }

    fn assert_partition(clusters: &Clusters, n: usize) {
        let mut seen: Vec<usize> = clusters.values().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_two_families_separate() {
        let input = sets(&[&["python", "sql"], &["python", "sql", "docker"], &["react", "css"]]);
        let clusters = cluster(&input, &options(0.3));
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[&0], vec![0, 1]);
        assert_eq!(clusters[&1], vec![2]);
    }

    #[test]
    fn test_empty_skill_set_stays_singleton() {
        let input = sets(&[&[], &["python"], &["python"], &[]]);
        for threshold in [0.0, 0.1, 0.5, 1.0] {
            let clusters = cluster(&input, &options(threshold));
            assert!(clusters.values().any(|m| m == &vec![0]));
            assert!(clusters.values().any(|m| m == &vec![3]));
        }
    }

    #[test]
    fn test_result_is_partition() {
        let input = sets(&[
            &["python", "sql"],
            &["java", "spring"],
            &["python", "spark"],
            &["java", "spring", "docker"],
            &[],
            &["react"],
        ]);
        let clusters = cluster(&input, &options(0.2));
        assert_partition(&clusters, input.len());
        let total: usize = clusters.values().map(Vec::len).sum();
        assert_eq!(total, input.len());
    }

    #[test]
    fn test_higher_threshold_never_merges_more() {
        let input = sets(&[
            &["python", "sql", "spark"],
            &["python", "sql"],
            &["python", "airflow"],
            &["java", "spring"],
            &["java", "spring", "kafka"],
            &["react", "css", "html"],
            &["react", "typescript"],
        ]);
        let mut previous = 0;
        for threshold in [0.1, 0.2, 0.3, 0.5, 0.7, 0.9, 1.0] {
            let count = cluster(&input, &options(threshold)).len();
            assert!(count >= previous, "threshold {threshold}: {count} < {previous}");
            previous = count;
        }
    }

    #[test]
    fn test_dense_ids_in_original_order() {
        let input = sets(&[&["go"], &["rust"], &["go"], &["rust"]]);
        let clusters = cluster(&input, &options(0.5));
        assert_eq!(clusters.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(clusters[&0], vec![0, 2]);
        assert_eq!(clusters[&1], vec![1, 3]);
    }

    #[test]
    fn test_merge_bound_stops_early() {
        let input = sets(&[&["sql"], &["sql"], &["sql"], &["sql"]]);
        let clusters = cluster(
            &input,
            &ClusterOptions {
                min_similarity: 0.5,
                max_iterations: 1,
                strategy: MergeStrategy::FirstFound,
            },
        );
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[&0], vec![0, 1]);
    }

    #[test]
    fn test_zero_iterations_keeps_singletons() {
        let input = sets(&[&["sql"], &["sql"]]);
        let clusters = cluster(
            &input,
            &ClusterOptions {
                max_iterations: 0,
                ..options(0.1)
            },
        );
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_first_found_follows_id_order() {
        // (0,1) = 1/3 qualifies before the stronger (1,2) = 1.0 is seen
        let input = sets(&[&["a", "b"], &["b", "c"], &["b", "c"]]);
        let first = cluster(&input, &options(0.3));
        assert_eq!(first[&0], vec![0, 1, 2]);

        let best = cluster(
            &input,
            &ClusterOptions {
                min_similarity: 0.5,
                strategy: MergeStrategy::BestPair,
                ..ClusterOptions::default()
            },
        );
        assert_eq!(best.len(), 2);
        assert_eq!(best[&0], vec![0]);
        assert_eq!(best[&1], vec![1, 2]);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(cluster(&[], &ClusterOptions::default()).is_empty());
    }

    #[test]
    fn test_effective_threshold_scales_for_small_corpus() {
        assert_eq!(effective_threshold(20, 0.3, 10), 0.3);
        assert_eq!(effective_threshold(10, 0.3, 10), 0.3);
        assert!((effective_threshold(5, 0.3, 10) - 0.225).abs() < 1e-9);
        assert!((effective_threshold(0, 0.3, 10) - 0.15).abs() < 1e-9);
        assert_eq!(effective_threshold(3, 0.3, 0), 0.3);
    }

    #[test]
    fn test_assign_clusters_marks_uncovered() {
        let mut clusters = Clusters::new();
        clusters.insert(0, vec![0, 2]);
        assert_eq!(assign_clusters(3, &clusters), vec![0, UNCLUSTERED, 0]);
    }

    #[test]
    fn test_apply_clusters_sets_posting_ids() {
        let mut postings = vec![
            Posting::with_skills("a", "Data", &["python", "sql"]),
            Posting::with_skills("b", "Data", &["python", "sql"]),
            Posting::with_skills("c", "Web", &["react"]),
        ];
        let clusters = cluster_postings(&postings, &options(0.3));
        apply_clusters(&mut postings, &clusters);
        assert_eq!(
            postings.iter().map(|p| p.cluster).collect::<Vec<_>>(),
            vec![0, 0, 1]
        );
    }

    #[test]
    fn test_merge_strategy_parses() {
        assert_eq!("best_pair".parse::<MergeStrategy>().unwrap(), MergeStrategy::BestPair);
        assert_eq!(" First_Found ".parse::<MergeStrategy>().unwrap(), MergeStrategy::FirstFound);
        assert!("random".parse::<MergeStrategy>().is_err());
    }
}
