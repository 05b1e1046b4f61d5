use thiserror::Error;

/// Failures that can prevent a run from starting. Everything that happens
/// after a run is underway is handled through phase guards instead of errors.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("question set is empty or invalid: {0}")]
    EmptyQuestionSet(String),

    #[error("question source unavailable: {0}")]
    SourceUnavailable(String),
}
