// Candidate and archetype guidance built on top of the market model.

pub mod archetype;
pub mod gap;

pub use archetype::{ArchetypeReport, Recommender};
pub use gap::{
    analyze_candidate, analyze_gap, best_cluster_for, compare_profiles, render_gap_report,
    GapAnalysis, GapReport,
};
