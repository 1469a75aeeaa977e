use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::SkillExtractor;
use crate::recommendation::Recommender;
use crate::vocabulary::SkillVocabulary;

/// Immutable services built once at startup and passed by reference into each
/// pipeline stage. Cheap to clone; safe to share across worker threads.
#[derive(Clone)]
pub struct AppState {
    pub vocabulary: Arc<SkillVocabulary>,
    /// Section-weighted extractor. Default strategies: pattern + fuzzy token.
    pub extractor: Arc<SkillExtractor>,
    pub recommender: Arc<Recommender>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let vocabulary = Arc::new(SkillVocabulary::builtin()?);
        let extractor = SkillExtractor::new(vocabulary.clone(), config.extraction_options());
        info!(
            "Skill extractor ready (strategies: {})",
            extractor.strategy_names().join(", ")
        );
        let recommender = Recommender::builtin(&vocabulary)?;

        Ok(Self {
            vocabulary,
            extractor: Arc::new(extractor),
            recommender: Arc::new(recommender),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_state_is_shareable() {
        assert_send_sync::<AppState>();
    }

    #[test]
    fn test_builds_from_default_config() {
        let state = AppState::new(Config::default()).unwrap();
        assert!(!state.vocabulary.is_empty());
        assert_eq!(state.recommender.archetypes().len(), 5);
        assert_eq!(state.extractor.strategy_names(), vec!["pattern", "fuzzy"]);
    }
}
