//! Wiring from configuration to a ready engine or agent.

use qa_agent_conversation::{detect_language, load_replies, Agent, AgentSettings};
use qa_agent_core::{config::AppConfig, AppResult};
use qa_agent_knowledge::config::load_config;
use qa_agent_knowledge::{
    create_provider, CorpusStore, EmbeddingConfig, IndexStore, KnowledgeBaseConfig, Language,
    RetrievalEngine,
};

/// Open the retrieval engine described by `config` and the workspace
/// knowledge settings.
pub async fn open_engine(config: &AppConfig) -> AppResult<(RetrievalEngine, KnowledgeBaseConfig)> {
    let kb_config = load_config(&config.workspace)?;
    let embedder = create_provider(&EmbeddingConfig::from(&kb_config)).await?;

    let engine = RetrievalEngine::open(
        CorpusStore::new(config.corpus_path(), &config.workspace),
        IndexStore::new(config.index_dir()),
        embedder,
    )
    .await;

    Ok((engine, kb_config))
}

/// Open an agent with the workspace's replies and settings.
pub async fn open_agent(config: &AppConfig) -> AppResult<Agent> {
    let (engine, kb_config) = open_engine(config).await?;
    let replies = load_replies(&config.workspace)?;
    let settings = AgentSettings::from_config(config, kb_config.threshold)?;

    Agent::new(engine, &replies, settings)
}

/// An explicit `--language` value, or the language detected from `text`.
pub fn resolve_language(
    explicit: Option<&str>,
    text: &str,
    config: &AppConfig,
) -> AppResult<Language> {
    match explicit {
        Some(code) => code.parse(),
        None => {
            let default = config.default_language.parse()?;
            Ok(detect_language(text, config.enable_arabic, default))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_language_wins() {
        let config = AppConfig::default();
        assert_eq!(
            resolve_language(Some("ar"), "hello", &config).unwrap(),
            Language::Ar
        );
        assert!(resolve_language(Some("fr"), "hello", &config).is_err());
    }

    #[test]
    fn test_language_detected_from_text() {
        let config = AppConfig::default();
        assert_eq!(
            resolve_language(None, "أين طلبي؟", &config).unwrap(),
            Language::Ar
        );
        assert_eq!(
            resolve_language(None, "Where is my order?", &config).unwrap(),
            Language::En
        );
    }
}
