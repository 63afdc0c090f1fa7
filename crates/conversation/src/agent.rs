//! The conversation orchestrator.

use crate::language::{detect_language, is_exit_command};
use crate::replies::Replies;
use crate::types::{AgentResponse, AgentSettings, ConversationTurn, ReplyKind, TurnOutcome};
use chrono::Utc;
use qa_agent_core::AppResult;
use qa_agent_knowledge::{Language, QaEntry, RetrievalEngine, TrainStats};
use std::collections::HashMap;

/// Answers user text from the knowledge base, in the user's language.
#[derive(Debug)]
pub struct Agent {
    engine: RetrievalEngine,
    settings: AgentSettings,
    phrases: HashMap<(Language, ReplyKind), String>,
    history: Vec<ConversationTurn>,
    current_language: Language,
}

impl Agent {
    /// Build an agent around an opened engine.
    ///
    /// Every reply is rendered once here, so a broken template fails
    /// construction instead of a conversation turn.
    pub fn new(
        engine: RetrievalEngine,
        replies: &Replies,
        settings: AgentSettings,
    ) -> AppResult<Self> {
        let mut phrases = HashMap::new();
        for language in [Language::En, Language::Ar] {
            for kind in ReplyKind::ALL {
                let text = replies.render(kind, language, &settings.name)?;
                phrases.insert((language, kind), text);
            }
        }

        tracing::info!("{} initialized successfully!", settings.name);

        Ok(Self {
            engine,
            current_language: settings.default_language,
            settings,
            phrases,
            history: Vec::new(),
        })
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    /// Language of the most recent user input (the default before any).
    pub fn current_language(&self) -> Language {
        self.current_language
    }

    fn phrase(&self, kind: ReplyKind, language: Language) -> &str {
        self.phrases
            .get(&(language, kind))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Greeting in the current language.
    pub fn greet(&self) -> &str {
        let greeting = self.phrase(ReplyKind::Greeting, self.current_language);
        tracing::info!("Agent: {}", greeting);
        greeting
    }

    /// Farewell in the current language.
    pub fn farewell(&self) -> &str {
        self.phrase(ReplyKind::Farewell, self.current_language)
    }

    /// Answer `query` in `language`, falling back to the canned reply.
    pub async fn process_query(&mut self, query: &str, language: Language) -> AgentResponse {
        tracing::info!("Processing query ({}): {}", language, query);

        let response = match self
            .engine
            .best_answer(query, Some(language), self.settings.threshold)
            .await
        {
            Some(answer) => AgentResponse {
                answer,
                found: true,
                language,
            },
            None => AgentResponse {
                answer: self.phrase(ReplyKind::Fallback, language).to_string(),
                found: false,
                language,
            },
        };

        self.history.push(ConversationTurn {
            query: query.to_string(),
            response: response.answer.clone(),
            language,
            at: Utc::now(),
        });

        response
    }

    /// Handle one line of user input.
    ///
    /// The detected language becomes the current language before the exit
    /// check, so the farewell matches the language the user signed off in.
    pub async fn respond(&mut self, text: &str) -> TurnOutcome {
        let language = detect_language(
            text,
            self.settings.enable_arabic,
            self.settings.default_language,
        );
        tracing::info!("User ({}): {}", language, text);
        self.current_language = language;

        if is_exit_command(text) {
            let farewell = self.farewell().to_string();
            tracing::info!("Agent: {}", farewell);
            return TurnOutcome::Exit { farewell, language };
        }

        let response = self.process_query(text, language).await;
        tracing::info!("Agent: {}", response.answer);
        TurnOutcome::Reply(response)
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("Conversation history cleared.");
    }

    /// Add Q&A pairs to the knowledge base.
    pub async fn train(&mut self, entries: Vec<QaEntry>) -> AppResult<TrainStats> {
        tracing::info!("Training agent with {} Q&A pairs...", entries.len());
        let stats = self.engine.train(entries).await?;
        tracing::info!("Training completed successfully!");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_agent_knowledge::embeddings::providers::TrigramProvider;
    use qa_agent_knowledge::{Category, CorpusStore, IndexStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn settings(enable_arabic: bool) -> AgentSettings {
        AgentSettings {
            name: "Sales Assistant".to_string(),
            default_language: Language::En,
            enable_arabic,
            threshold: 0.5,
        }
    }

    async fn agent_in(temp: &TempDir, enable_arabic: bool) -> Agent {
        let engine = RetrievalEngine::open(
            CorpusStore::new(temp.path().join("data/qa_database.json"), temp.path()),
            IndexStore::new(temp.path().join("data/vector_db")),
            Arc::new(TrigramProvider::new(384)),
        )
        .await;

        let replies = Replies::builtin().unwrap();
        let mut agent = Agent::new(engine, &replies, settings(enable_arabic)).unwrap();
        agent
            .train(vec![
                QaEntry::new(
                    "What is your return policy?",
                    "30-day returns.",
                    Language::En,
                    Category::PostSales,
                ),
                QaEntry::new(
                    "ما هي سياسة الإرجاع؟",
                    "يمكنك إرجاع المنتج خلال 30 يومًا.",
                    Language::Ar,
                    Category::PostSales,
                ),
            ])
            .await
            .unwrap();
        agent
    }

    #[tokio::test]
    async fn test_greet_uses_default_language() {
        let temp = TempDir::new().unwrap();
        let agent = agent_in(&temp, true).await;
        assert_eq!(
            agent.greet(),
            "Hello! I am Sales Assistant. How can I help you today?"
        );
    }

    #[tokio::test]
    async fn test_process_query_found_and_recorded() {
        let temp = TempDir::new().unwrap();
        let mut agent = agent_in(&temp, true).await;

        let response = agent
            .process_query("What's the return policy?", Language::En)
            .await;

        assert!(response.found);
        assert_eq!(response.answer, "30-day returns.");
        assert_eq!(agent.history().len(), 1);
        assert_eq!(agent.history()[0].response, "30-day returns.");
    }

    #[tokio::test]
    async fn test_unknown_question_gets_fallback() {
        let temp = TempDir::new().unwrap();
        let mut agent = agent_in(&temp, true).await;

        let response = agent
            .process_query("Can I book a helicopter tour?", Language::En)
            .await;

        assert!(!response.found);
        assert!(response.answer.starts_with("I apologize"));
        assert_eq!(agent.history().len(), 1);
    }

    #[tokio::test]
    async fn test_arabic_input_switches_language() {
        let temp = TempDir::new().unwrap();
        let mut agent = agent_in(&temp, true).await;

        let outcome = agent.respond("ما هي سياسة الإرجاع؟").await;

        assert_eq!(agent.current_language(), Language::Ar);
        match outcome {
            TurnOutcome::Reply(response) => {
                assert_eq!(response.language, Language::Ar);
                assert!(response.found);
                assert_eq!(response.answer, "يمكنك إرجاع المنتج خلال 30 يومًا.");
            }
            other => panic!("expected a reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exit_command_returns_farewell_without_history() {
        let temp = TempDir::new().unwrap();
        let mut agent = agent_in(&temp, true).await;

        assert_eq!(
            agent.respond("ok bye").await,
            TurnOutcome::Exit {
                farewell: "Thank you for contacting us. Goodbye!".to_string(),
                language: Language::En,
            }
        );
        assert_eq!(
            agent.respond("وداعا").await,
            TurnOutcome::Exit {
                farewell: "شكراً لتواصلك معنا. وداعاً!".to_string(),
                language: Language::Ar,
            }
        );
        assert!(agent.history().is_empty());
        assert_eq!(agent.farewell(), "شكراً لتواصلك معنا. وداعاً!");
    }

    #[tokio::test]
    async fn test_disabled_arabic_keeps_default_language() {
        let temp = TempDir::new().unwrap();
        let mut agent = agent_in(&temp, false).await;

        match agent.respond("ما هي سياسة الإرجاع؟").await {
            TurnOutcome::Reply(response) => assert_eq!(response.language, Language::En),
            other => panic!("expected a reply, got {:?}", other),
        }
        assert_eq!(agent.current_language(), Language::En);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let temp = TempDir::new().unwrap();
        let mut agent = agent_in(&temp, true).await;

        agent.respond("What is your return policy?").await;
        agent.respond("Where is my parcel?").await;
        assert_eq!(agent.history().len(), 2);

        agent.clear_history();
        assert!(agent.history().is_empty());
    }
}
