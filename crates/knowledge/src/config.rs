//! Knowledge base configuration management.

use qa_agent_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retrieval settings for the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Embedding provider ("trigram", "ollama")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Embedding model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding vector dimension
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: u32,

    /// Minimum similarity for an answer to be accepted
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Candidates fetched from the index per search
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

fn default_provider() -> String {
    "trigram".to_string()
}

fn default_model() -> String {
    "trigram-v1".to_string()
}

fn default_embedding_dim() -> u32 {
    384
}

fn default_threshold() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    3
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            embedding_dim: default_embedding_dim(),
            threshold: default_threshold(),
            top_k: default_top_k(),
        }
    }
}

impl KnowledgeBaseConfig {
    /// Reject settings the engine cannot honor.
    pub fn validate(&self) -> AppResult<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(AppError::Config(format!(
                "Similarity threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.embedding_dim == 0 {
            return Err(AppError::Config(
                "Embedding dimension must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load knowledge base configuration.
///
/// Loads from `.qa-agent/knowledge.yaml` if it exists, otherwise returns
/// the defaults (local trigram embeddings, threshold 0.7, top-3).
pub fn load_config(workspace: &Path) -> AppResult<KnowledgeBaseConfig> {
    let config_path = get_config_path(workspace);

    if !config_path.exists() {
        tracing::debug!("No knowledge config at {:?}, using defaults", config_path);
        return Ok(KnowledgeBaseConfig::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let config: KnowledgeBaseConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;

    config.validate()?;

    tracing::debug!("Loaded knowledge config from {:?}", config_path);
    Ok(config)
}

/// Save knowledge base configuration.
pub fn save_config(workspace: &Path, config: &KnowledgeBaseConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let yaml = serde_yaml::to_string(config)?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved knowledge config to {:?}", config_path);
    Ok(())
}

/// Get the path to the knowledge config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".qa-agent").join("knowledge.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path()).unwrap();

        assert_eq!(config.provider, "trigram");
        assert_eq!(config.embedding_dim, 384);
        assert_eq!(config.top_k, 3);
        assert!((config.threshold - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let config = KnowledgeBaseConfig {
            threshold: 0.55,
            top_k: 5,
            ..Default::default()
        };

        save_config(temp.path(), &config).unwrap();

        let loaded = load_config(temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = get_config_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "threshold: 0.5\n").unwrap();

        let loaded = load_config(temp.path()).unwrap();
        assert!((loaded.threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(loaded.model, "trigram-v1");
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let config = KnowledgeBaseConfig {
            threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = KnowledgeBaseConfig {
            threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
