//! Search command handler.
//!
//! Lists the nearest corpus entries with their similarity scores.

use crate::session::open_engine;
use clap::Args;
use qa_agent_core::{config::AppConfig, AppResult};
use qa_agent_knowledge::Language;

/// Show the closest corpus entries for a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of candidates to retrieve (default: top_k from knowledge.yaml)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Keep only entries in this language (en, ar)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let language = self
            .language
            .as_deref()
            .map(str::parse::<Language>)
            .transpose()?;

        let (engine, kb_config) = open_engine(config).await?;
        let top_k = self.top_k.unwrap_or(kb_config.top_k as usize);

        let results = engine.search(&self.query, top_k, language).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No matching entries.");
            return Ok(());
        }

        for (rank, result) in results.iter().enumerate() {
            println!(
                "{}. [{:.3}] ({}, {}) {}",
                rank + 1,
                result.similarity,
                result.language,
                result.category,
                result.question
            );
            println!("   {}", result.answer);
        }

        Ok(())
    }
}
