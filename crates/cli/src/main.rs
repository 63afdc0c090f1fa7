//! QA Agent CLI
//!
//! Main entry point for the qa-agent command-line tool.
//! Answers customer questions from a bilingual (English/Arabic) Q&A corpus.

mod commands;
mod session;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, ReindexCommand, SearchCommand, StatsCommand, TrainCommand,
    ValidateCommand,
};
use qa_agent_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// QA Agent CLI - bilingual answers from a curated Q&A corpus
#[derive(Parser, Debug)]
#[command(name = "qa-agent")]
#[command(about = "Bilingual Q&A agent over a curated corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "QA_AGENT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "QA_AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer one question
    Ask(AskCommand),

    /// Show the closest corpus entries for a query
    Search(SearchCommand),

    /// Interactive text conversation
    Chat(ChatCommand),

    /// Add Q&A pairs from a file or interactively
    Train(TrainCommand),

    /// Rebuild the vector index from the corpus
    Reindex(ReindexCommand),

    /// Show corpus and index statistics
    Stats(StatsCommand),

    /// Check the structure of a Q&A document
    Validate(ValidateCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Search(_) => "search",
            Commands::Chat(_) => "chat",
            Commands::Train(_) => "train",
            Commands::Reindex(_) => "reindex",
            Commands::Stats(_) => "stats",
            Commands::Validate(_) => "validate",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file and environment, then CLI overrides
    let config = AppConfig::load_with(cli.workspace, cli.config)?.with_overrides(
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("QA Agent CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Corpus: {:?}", config.corpus_path());
    tracing::debug!("Index: {:?}", config.index_dir());

    config.validate()?;
    config.ensure_state_dir()?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Train(cmd) => cmd.execute(&config).await,
        Commands::Reindex(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Validate(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
