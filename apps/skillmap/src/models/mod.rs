pub mod candidate;
pub mod posting;

pub use candidate::CandidateProfile;
pub use posting::{Posting, WeightedSkill, UNCLUSTERED};
