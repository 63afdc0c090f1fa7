//! Knowledge system type definitions.

use qa_agent_core::AppError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Language a Q&A entry is written in.
///
/// Deserializes through [`FromStr`], so stored values are read exactly as
/// validation and the CLI read them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ar,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl Language {
    /// Short language code as stored in the corpus ("en", "ar").
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// Human-readable language name.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "Arabic",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(AppError::Knowledge(format!(
                "Unsupported language: '{}'. Supported: en, ar",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Support stage a Q&A entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PreSales,
    PostSales,
    General,
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::PreSales => "pre_sales",
            Category::PostSales => "post_sales",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pre_sales" => Ok(Category::PreSales),
            "post_sales" => Ok(Category::PostSales),
            "general" => Ok(Category::General),
            other => Err(AppError::Knowledge(format!(
                "Unsupported category: '{}'. Supported: pre_sales, post_sales, general",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single question/answer pair in the corpus.
///
/// Entries have no id of their own: an entry is identified by its position
/// in the corpus, which is also its row in the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    #[serde(default)]
    pub question: String,

    #[serde(default)]
    pub answer: String,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub category: Category,
}

impl QaEntry {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        language: Language,
        category: Category,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            language,
            category,
        }
    }
}

/// A corpus entry matched by a search, annotated with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub question: String,
    pub answer: String,
    pub language: Language,
    pub category: Category,

    /// `1 / (1 + squared_distance)`, in (0, 1]. A normalized closeness
    /// value, not a calibrated probability.
    pub similarity: f32,

    /// Squared Euclidean distance between query and question embeddings
    #[serde(skip_serializing, default)]
    pub distance: f32,

    /// Corpus position of the matched entry
    #[serde(skip_serializing, default)]
    pub row: usize,
}

impl ScoredEntry {
    pub fn from_entry(entry: &QaEntry, row: usize, distance: f32, similarity: f32) -> Self {
        Self {
            question: entry.question.clone(),
            answer: entry.answer.clone(),
            language: entry.language,
            category: entry.category,
            similarity,
            distance,
            row,
        }
    }
}

/// Statistics from a training call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainStats {
    /// Entries appended by this call
    pub added: usize,

    /// Corpus length after the call
    pub total: usize,

    /// Rows in the rebuilt index
    pub index_rows: usize,

    /// Whether the corpus document was saved; when false the new entries
    /// live only in memory
    pub persisted: bool,

    /// Wall-clock duration in seconds
    pub duration_secs: f64,
}

/// Snapshot of the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeStats {
    pub entries: usize,
    pub by_language: BTreeMap<Language, usize>,
    pub by_category: BTreeMap<Category, usize>,
    pub index_rows: usize,
    pub dimension: usize,
    pub provider: String,
    pub model: String,
}
