//! Stats command handler.
//!
//! Shows corpus and index statistics.

use crate::session::open_engine;
use clap::Args;
use qa_agent_core::{config::AppConfig, AppResult};

/// Show corpus and index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let (engine, _) = open_engine(config).await?;
        let stats = engine.stats();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Knowledge base: {}", config.corpus_path().display());
        println!("  Entries: {}", stats.entries);
        for (language, count) in &stats.by_language {
            println!("    {}: {}", language.display_name(), count);
        }
        for (category, count) in &stats.by_category {
            println!("    {}: {}", category, count);
        }
        println!("  Indexed rows: {}", stats.index_rows);
        println!(
            "  Embeddings: {} ({}, {} dimensions)",
            stats.provider, stats.model, stats.dimension
        );

        Ok(())
    }
}
