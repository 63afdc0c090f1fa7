//! Chat command handler.
//!
//! Text conversation on stdin/stdout: greeting, one reply per line,
//! farewell on an exit command or end of input.

use crate::session::open_agent;
use clap::Args;
use qa_agent_conversation::TurnOutcome;
use qa_agent_core::{config::AppConfig, AppResult};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive text conversation
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut agent = open_agent(config).await?;
        let name = agent.settings().name.clone();

        println!("{}: {}", name, agent.greet());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            match agent.respond(text).await {
                TurnOutcome::Reply(response) => println!("{}: {}", name, response.answer),
                TurnOutcome::Exit { farewell, .. } => {
                    println!("{}: {}", name, farewell);
                    tracing::info!("Chat ended after {} turns", agent.history().len());
                    return Ok(());
                }
            }
        }

        // End of input counts as leaving
        println!();
        println!("{}: {}", name, agent.farewell());
        tracing::info!("Chat ended after {} turns", agent.history().len());

        Ok(())
    }
}
