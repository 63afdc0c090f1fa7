//! Reindex command handler.

use crate::session::open_engine;
use clap::Args;
use qa_agent_core::{config::AppConfig, AppResult};

/// Rebuild the vector index from the corpus
#[derive(Args, Debug)]
pub struct ReindexCommand {}

impl ReindexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reindex command");

        let (mut engine, _) = open_engine(config).await?;
        let rows = engine.rebuild_index().await?;

        if rows == 0 {
            println!("Corpus is empty; nothing to index.");
        } else {
            println!("Rebuilt index with {} entries", rows);
        }

        Ok(())
    }
}
