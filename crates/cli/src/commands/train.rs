//! Train command handler.
//!
//! Adds Q&A pairs from a JSON training file, or interactively from stdin,
//! then rebuilds the index.

use crate::session::open_engine;
use clap::Args;
use qa_agent_core::{config::AppConfig, AppError, AppResult};
use qa_agent_knowledge::config::{get_config_path, save_config};
use qa_agent_knowledge::{load_training_file, Category, Language, QaEntry};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Add Q&A pairs from a file or interactively
#[derive(Args, Debug)]
pub struct TrainCommand {
    /// Training file (`{"qa_pairs": [...]}`); prompts on stdin when omitted
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TrainCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing train command");

        let entries = match &self.file {
            Some(path) => load_training_file(path)?,
            None => read_pairs(std::io::stdin().lock(), std::io::stdout().lock())?,
        };

        if entries.is_empty() {
            println!("No Q&A pairs added. Training cancelled.");
            return Ok(());
        }

        let (mut engine, kb_config) = open_engine(config).await?;

        // Record the embedding settings the index is built with
        if !get_config_path(&config.workspace).exists() {
            save_config(&config.workspace, &kb_config)?;
        }

        let stats = engine.train(entries).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Trained {} Q&A pairs ({} total, {} indexed) in {:.2}s",
                stats.added, stats.total, stats.index_rows, stats.duration_secs
            );
            if !stats.persisted {
                println!(
                    "Warning: could not save {}; the new pairs are not persisted",
                    config.corpus_path().display()
                );
            }
        }

        Ok(())
    }
}

/// Prompt for Q&A pairs until `done` or end of input.
fn read_pairs<R: BufRead, W: Write>(mut input: R, mut output: W) -> AppResult<Vec<QaEntry>> {
    writeln!(output, "Enter Q&A pairs (type 'done' when finished)")?;

    let mut entries = Vec::new();
    loop {
        let Some(question) = prompt(&mut input, &mut output, "Question (or 'done' to finish): ")?
        else {
            break;
        };

        if question.eq_ignore_ascii_case("done") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        let answer = prompt(&mut input, &mut output, "Answer: ")?.unwrap_or_default();
        let language: Language =
            prompt_choice(&mut input, &mut output, "Language (en/ar) [default: en]: ")?;
        let category: Category = prompt_choice(
            &mut input,
            &mut output,
            "Category (pre_sales/post_sales/general) [default: general]: ",
        )?;

        entries.push(QaEntry::new(question, answer, language, category));
        writeln!(output, "✓ Added Q&A pair (Total: {})", entries.len())?;
    }

    Ok(entries)
}

/// One trimmed line, or `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> AppResult<Option<String>> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_string()))
}

/// Ask until the answer parses; blank input or end of input picks the default.
fn prompt_choice<T, R, W>(input: &mut R, output: &mut W, label: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError> + Default,
    R: BufRead,
    W: Write,
{
    loop {
        match prompt(input, output, label)? {
            None => return Ok(T::default()),
            Some(value) if value.is_empty() => return Ok(T::default()),
            Some(value) => match value.parse() {
                Ok(parsed) => return Ok(parsed),
                Err(e) => writeln!(output, "✗ {}", e)?,
            },
        }
    }
}
