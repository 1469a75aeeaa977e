use thiserror::Error;

use crate::vocabulary::VocabularyError;

/// Application-level error type.
/// Per-record extraction problems are not errors at this level; they are
/// reported through `BatchReport`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),

    #[error("Unknown cluster: {0}")]
    UnknownCluster(usize),

    #[error("Market model has no clusters")]
    NoClusters,

    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Stable machine-readable code, logged alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownArchetype(_) => "UNKNOWN_ARCHETYPE",
            AppError::UnknownCluster(_) => "UNKNOWN_CLUSTER",
            AppError::NoClusters => "NO_CLUSTERS",
            AppError::Vocabulary(_) => "VOCABULARY_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
        }
    }

    /// Configuration problems are fatal and never worth retrying.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::UnknownArchetype(_) | AppError::Vocabulary(_) | AppError::Config(_)
        )
    }
}
