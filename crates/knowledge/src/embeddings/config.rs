//! Embedding configuration types.

use crate::config::KnowledgeBaseConfig;
use serde::{Deserialize, Serialize};

/// Embedding configuration for the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram", "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
        }
    }
}

impl From<&KnowledgeBaseConfig> for EmbeddingConfig {
    fn from(config: &KnowledgeBaseConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            dimensions: config.embedding_dim as usize,
        }
    }
}
