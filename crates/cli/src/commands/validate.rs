//! Validate command handler.
//!
//! Checks the structure of a Q&A document (the corpus by default).

use clap::Args;
use qa_agent_core::{config::AppConfig, AppError, AppResult};
use qa_agent_knowledge::{validate_document, Category, Language};
use std::path::PathBuf;

/// Check the structure of a Q&A document
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Document to check (default: the configured corpus)
    pub path: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ValidateCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let path = self.path.clone().unwrap_or_else(|| config.corpus_path());
        tracing::info!("Validating {:?}", path);

        let report = validate_document(&path)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("✓ Loaded {} Q&A pairs", report.total);
            for language in [Language::En, Language::Ar] {
                println!(
                    "  - {}: {}",
                    language.display_name(),
                    report.language_count(language)
                );
            }
            for category in [Category::PreSales, Category::PostSales, Category::General] {
                println!("  - {}: {}", category, report.category_count(category));
            }

            for issue in &report.issues {
                println!("✗ {}", issue);
            }
            if report.is_valid() {
                println!("✓ All Q&A pairs have valid structure");
            }
        }

        if !report.is_valid() {
            return Err(AppError::Knowledge(format!(
                "{} problems found in {:?}",
                report.issues.len(),
                path
            )));
        }

        Ok(())
    }
}
