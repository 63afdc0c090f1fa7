//! Error types for the QA agent.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! retrieval (index, embedding, storage) and conversation errors.

use thiserror::Error;

/// Unified error type for the QA agent.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Retrieval failures are represented here and degraded by the caller,
/// never turned into panics.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vectors of inconsistent dimension were fed to the index
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// The vector index holds no rows (or has not been built)
    #[error("Vector index is empty")]
    EmptyIndex,

    /// The embedder failed to produce a vector
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Corpus or index storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Knowledge base errors not covered above
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Conversation and reply template errors
    #[error("Conversation error: {0}")]
    Conversation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
