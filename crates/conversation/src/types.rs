//! Conversation types for the Q&A agent.

use chrono::{DateTime, Utc};
use qa_agent_core::{AppConfig, AppResult};
use qa_agent_knowledge::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent identity and answer policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Name used in greetings
    pub name: String,

    /// Language used before any user input and when Arabic is disabled
    pub default_language: Language,

    pub enable_arabic: bool,

    /// Minimum similarity for an answer to be used instead of the fallback
    pub threshold: f32,
}

impl AgentSettings {
    /// Settings from the application config plus the retrieval threshold.
    pub fn from_config(config: &AppConfig, threshold: f32) -> AppResult<Self> {
        Ok(Self {
            name: config.agent_name.clone(),
            default_language: config.default_language.parse()?,
            enable_arabic: config.enable_arabic,
            threshold,
        })
    }
}

/// The three canned replies every language provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReplyKind {
    Greeting,
    Fallback,
    Farewell,
}

impl ReplyKind {
    pub const ALL: [ReplyKind; 3] = [ReplyKind::Greeting, ReplyKind::Fallback, ReplyKind::Farewell];

    pub fn as_str(self) -> &'static str {
        match self {
            ReplyKind::Greeting => "greeting",
            ReplyKind::Fallback => "fallback",
            ReplyKind::Farewell => "farewell",
        }
    }
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply templates for one language, loaded from YAML.
///
/// Templates use Handlebars syntax; `{{agentName}}` is the only variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyTemplates {
    pub language: Language,
    pub greeting: String,
    pub fallback: String,
    pub farewell: String,
}

impl ReplyTemplates {
    pub fn template(&self, kind: ReplyKind) -> &str {
        match kind {
            ReplyKind::Greeting => &self.greeting,
            ReplyKind::Fallback => &self.fallback,
            ReplyKind::Farewell => &self.farewell,
        }
    }
}

/// Result of answering one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub answer: String,

    /// Whether the answer came from the knowledge base
    pub found: bool,

    pub language: Language,
}

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
    pub language: Language,
    pub at: DateTime<Utc>,
}

/// What the agent does with one line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Answer (or fallback) for a query
    Reply(AgentResponse),

    /// The user asked to leave
    Exit { farewell: String, language: Language },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_templates_deserialization() {
        let yaml = r#"
language: ar
greeting: "أهلاً! أنا {{agentName}}."
fallback: "لا أعرف."
farewell: "مع السلامة!"
"#;

        let templates: ReplyTemplates = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(templates.language, Language::Ar);
        assert_eq!(templates.template(ReplyKind::Farewell), "مع السلامة!");
        assert!(templates.greeting.contains("{{agentName}}"));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = AppConfig::default();
        config.default_language = "ar".to_string();
        config.enable_arabic = false;

        let settings = AgentSettings::from_config(&config, 0.6).unwrap();
        assert_eq!(settings.default_language, Language::Ar);
        assert!(!settings.enable_arabic);
        assert_eq!(settings.threshold, 0.6);
        assert_eq!(settings.name, config.agent_name);
    }

    #[test]
    fn test_settings_reject_unknown_language() {
        let mut config = AppConfig::default();
        config.default_language = "fr".to_string();
        assert!(AgentSettings::from_config(&config, 0.7).is_err());
    }
}
