//! Ask command handler.
//!
//! Answers a single question through the agent, with fallback.

use crate::session::{open_agent, resolve_language};
use clap::Args;
use qa_agent_core::{config::AppConfig, AppResult};

/// Answer one question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Answer language (en, ar); detected from the question when omitted
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let language = resolve_language(self.language.as_deref(), &self.query, config)?;
        let mut agent = open_agent(config).await?;

        let response = agent.process_query(&self.query, language).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", response.answer);
        }

        Ok(())
    }
}
