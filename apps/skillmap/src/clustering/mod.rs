// Job-family clustering over extracted skill sets.
// Deterministic and bounded: the merge loop never runs more than max_iterations merges.

pub mod engine;
pub mod similarity;

pub use engine::{
    apply_clusters, assign_clusters, cluster, cluster_postings, effective_threshold,
    ClusterOptions, Clusters, MergeStrategy,
};
pub use similarity::{jaccard, skill_set, SkillSet};
