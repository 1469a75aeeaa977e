// Skill extraction: text cleaning, section location, token matching and the
// section-weighted pipeline that ties them together.
// Everything here is synchronous and CPU-bound; callers off the main task use spawn_blocking.

pub mod cleaner;
pub mod matcher;
pub mod pipeline;
pub mod sections;

pub use matcher::{FuzzyTokenStrategy, MatchStrategy, PatternStrategy, SkillMatch, SkillMatcher};
pub use pipeline::{
    BatchReport, ExtractionError, ExtractionOptions, FailureSummary, RecordFailure, RecordOutcome,
    SkillExtractor,
};
