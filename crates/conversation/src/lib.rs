//! Conversation layer for the Q&A agent.
//!
//! This crate turns user text into replies with:
//! - Language detection and exit-command handling
//! - Bilingual reply templates (Handlebars, YAML overrides)
//! - Fallback replies when the knowledge base has no confident answer
//! - Conversation history

pub mod agent;
pub mod language;
pub mod replies;
pub mod types;

// Re-export main types
pub use agent::Agent;
pub use language::{detect_language, is_exit_command};
pub use replies::{load_replies, Replies};
pub use types::{
    AgentResponse, AgentSettings, ConversationTurn, ReplyKind, ReplyTemplates, TurnOutcome,
};
