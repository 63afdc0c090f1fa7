//! Command handlers for the QA Agent CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod reindex;
pub mod search;
pub mod stats;
pub mod train;
pub mod validate;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use reindex::ReindexCommand;
pub use search::SearchCommand;
pub use stats::StatsCommand;
pub use train::TrainCommand;
pub use validate::ValidateCommand;
