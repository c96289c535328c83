use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::LoadError;

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Error loading questions from file.
    #[error("failed to load questions: {0}")]
    Load(#[from] LoadError),

    /// Invalid settings.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// IO error during quiz execution.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
