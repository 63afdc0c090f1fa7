//! Canned replies: built-in bilingual defaults plus workspace overrides.
//!
//! Overrides live in `.qa-agent/replies/*.yml`, one `ReplyTemplates`
//! document per language. A file for a language replaces all three of that
//! language's templates.

use crate::types::{ReplyKind, ReplyTemplates};
use handlebars::Handlebars;
use qa_agent_core::{AppError, AppResult};
use qa_agent_knowledge::Language;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Registered reply templates for every supported language.
#[derive(Debug, Clone)]
pub struct Replies {
    handlebars: Handlebars<'static>,
}

impl Replies {
    /// The built-in English and Arabic replies.
    pub fn builtin() -> AppResult<Self> {
        Self::from_templates(vec![
            builtin_templates(Language::En),
            builtin_templates(Language::Ar),
        ])
    }

    /// Register `templates`; languages not covered keep the built-in text.
    pub fn from_templates(templates: Vec<ReplyTemplates>) -> AppResult<Self> {
        let mut by_language: HashMap<Language, ReplyTemplates> = [Language::En, Language::Ar]
            .into_iter()
            .map(|l| (l, builtin_templates(l)))
            .collect();

        for t in templates {
            validate_templates(&t)?;
            by_language.insert(t.language, t);
        }

        let mut handlebars = Handlebars::new();

        // Replies are plain text
        handlebars.register_escape_fn(handlebars::no_escape);

        for (language, t) in &by_language {
            for kind in ReplyKind::ALL {
                handlebars
                    .register_template_string(&template_name(*language, kind), t.template(kind))
                    .map_err(|e| {
                        AppError::Conversation(format!(
                            "Failed to register {} {} template: {}",
                            language, kind, e
                        ))
                    })?;
            }
        }

        Ok(Self { handlebars })
    }

    /// Render one reply for the given agent name.
    pub fn render(
        &self,
        kind: ReplyKind,
        language: Language,
        agent_name: &str,
    ) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("agentName", agent_name);

        self.handlebars
            .render(&template_name(language, kind), &variables)
            .map_err(|e| {
                AppError::Conversation(format!(
                    "Failed to render {} {} reply: {}",
                    language, kind, e
                ))
            })
    }
}

/// Load replies for a workspace, applying any overrides found.
pub fn load_replies(workspace_path: &Path) -> AppResult<Replies> {
    let replies_dir = workspace_path.join(".qa-agent/replies");

    let mut templates = Vec::new();
    for path in list_reply_files(&replies_dir) {
        templates.push(load_reply_file(&path)?);
    }

    Replies::from_templates(templates)
}

fn list_reply_files(replies_dir: &Path) -> Vec<PathBuf> {
    if !replies_dir.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(replies_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.is_file()
                && matches!(
                    p.extension().and_then(|s| s.to_str()),
                    Some("yml") | Some("yaml")
                )
        })
        .collect();

    // Later files win for the same language
    files.sort();
    files
}

fn load_reply_file(path: &Path) -> AppResult<ReplyTemplates> {
    tracing::debug!("Loading replies from: {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Conversation(format!("Failed to read reply file {:?}: {}", path, e))
    })?;

    let templates: ReplyTemplates = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Conversation(format!("Failed to parse reply YAML {:?}: {}", path, e))
    })?;

    tracing::info!("Loaded {} replies from {:?}", templates.language, path);

    Ok(templates)
}

fn validate_templates(t: &ReplyTemplates) -> AppResult<()> {
    for kind in ReplyKind::ALL {
        if t.template(kind).trim().is_empty() {
            return Err(AppError::Conversation(format!(
                "The {} {} reply cannot be empty",
                t.language, kind
            )));
        }
    }
    Ok(())
}

fn template_name(language: Language, kind: ReplyKind) -> String {
    format!("{}.{}", language.code(), kind.as_str())
}

fn builtin_templates(language: Language) -> ReplyTemplates {
    match language {
        Language::En => ReplyTemplates {
            language,
            greeting: "Hello! I am {{agentName}}. How can I help you today?".to_string(),
            fallback: "I apologize, but I don't have an answer to that question. Could you please rephrase or ask something else?".to_string(),
            farewell: "Thank you for contacting us. Goodbye!".to_string(),
        },
        Language::Ar => ReplyTemplates {
            language,
            greeting: "مرحباً! أنا {{agentName}}. كيف يمكنني مساعدتك اليوم؟".to_string(),
            fallback: "أعتذر، لكن ليس لدي إجابة على هذا السؤال. هل يمكنك إعادة صياغته أو طرح سؤال آخر؟".to_string(),
            farewell: "شكراً لتواصلك معنا. وداعاً!".to_string(),
        },
    }
}
