//! Training-file ingestion and Q&A document validation.

use crate::corpus::read_document;
use crate::types::{Category, Language, QaEntry};
use qa_agent_core::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Keys every Q&A pair must carry.
pub const REQUIRED_KEYS: [&str; 4] = ["question", "answer", "language", "category"];

/// Load Q&A pairs from a training file.
///
/// A missing or malformed file is an error, not an empty result.
pub fn load_training_file(path: &Path) -> AppResult<Vec<QaEntry>> {
    let document = read_document(path)?;
    tracing::info!(
        "Loaded {} Q&A pairs from {:?}",
        document.qa_pairs.len(),
        path
    );
    Ok(document.qa_pairs)
}

/// A problem with one pair of a Q&A document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    NotAnObject { index: usize },
    MissingKey { index: usize, key: &'static str },
    UnsupportedLanguage { index: usize, value: String },
    UnsupportedCategory { index: usize, value: String },
    /// Keys and values look right but the pair still does not load
    Unreadable { index: usize, reason: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::NotAnObject { index } => write!(f, "Q&A pair {} is not an object", index),
            Issue::MissingKey { index, key } => {
                write!(f, "Q&A pair {} missing key: {}", index, key)
            }
            Issue::UnsupportedLanguage { index, value } => {
                write!(f, "Q&A pair {} has unsupported language: {}", index, value)
            }
            Issue::UnsupportedCategory { index, value } => {
                write!(f, "Q&A pair {} has unsupported category: {}", index, value)
            }
            Issue::Unreadable { index, reason } => {
                write!(f, "Q&A pair {} cannot be loaded: {}", index, reason)
            }
        }
    }
}

/// Summary of a Q&A document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub total: usize,

    /// Counts keyed by the raw `language` value
    pub by_language: BTreeMap<String, usize>,

    /// Counts keyed by the raw `category` value
    pub by_category: BTreeMap<String, usize>,

    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn language_count(&self, language: Language) -> usize {
        self.by_language.get(language.code()).copied().unwrap_or(0)
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.by_category.get(category.as_str()).copied().unwrap_or(0)
    }
}

/// Check the structure of a Q&A document without loading it as a corpus.
///
/// # Errors
/// * `AppError::Storage` - the file cannot be read or is not JSON
/// * `AppError::Knowledge` - `qa_pairs` is present but not an array
pub fn validate_document(path: &Path) -> AppResult<ValidationReport> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Storage(format!("Failed to read {:?}: {}", path, e)))?;

    let value: Value = serde_json::from_str(&content)
        .map_err(|e| AppError::Storage(format!("Failed to parse {:?}: {}", path, e)))?;

    let mut report = validate_value(&value)?;
    report.path = path.to_path_buf();
    Ok(report)
}

fn validate_value(document: &Value) -> AppResult<ValidationReport> {
    let pairs = match document.get("qa_pairs") {
        None => return Ok(ValidationReport::default()),
        Some(Value::Array(pairs)) => pairs,
        Some(_) => {
            return Err(AppError::Knowledge(
                "qa_pairs must be an array".to_string(),
            ))
        }
    };

    let mut report = ValidationReport {
        total: pairs.len(),
        ..Default::default()
    };

    for (index, pair) in pairs.iter().enumerate() {
        let Some(object) = pair.as_object() else {
            report.issues.push(Issue::NotAnObject { index });
            continue;
        };
        let issues_before = report.issues.len();

        for key in REQUIRED_KEYS {
            if !object.contains_key(key) {
                report.issues.push(Issue::MissingKey { index, key });
            }
        }

        if let Some(language) = object.get("language") {
            let raw = raw_value(language);
            if raw.parse::<Language>().is_err() {
                report.issues.push(Issue::UnsupportedLanguage {
                    index,
                    value: raw.clone(),
                });
            }
            *report.by_language.entry(raw).or_insert(0) += 1;
        }

        if let Some(category) = object.get("category") {
            let raw = raw_value(category);
            if raw.parse::<Category>().is_err() {
                report.issues.push(Issue::UnsupportedCategory {
                    index,
                    value: raw.clone(),
                });
            }
            *report.by_category.entry(raw).or_insert(0) += 1;
        }

        // Anything the corpus loader would reject must be reported too
        let already_reported = report.issues.len() > issues_before;
        if !already_reported {
            if let Err(e) = serde_json::from_value::<QaEntry>(pair.clone()) {
                report.issues.push(Issue::Unreadable {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn raw_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusStore;
    use tempfile::TempDir;

    fn write(temp: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_training_file_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "train.json",
            r#"{"qa_pairs": [
                {"question": "Do you ship abroad?", "answer": "Yes.", "language": "en", "category": "pre_sales"},
                {"question": "Only a question"}
            ]}"#,
        );

        let entries = load_training_file(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, Category::PreSales);
        assert_eq!(entries[1].answer, "");
        assert_eq!(entries[1].language, Language::En);
        assert_eq!(entries[1].category, Category::General);
    }

    #[test]
    fn test_load_training_file_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let result = load_training_file(&temp.path().join("absent.json"));
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[test]
    fn test_load_training_file_malformed_is_error() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "bad.json", "[not json");
        assert!(load_training_file(&path).is_err());
    }

    #[test]
    fn test_validate_counts_languages_and_categories() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "qa.json",
            r#"{"qa_pairs": [
                {"question": "a", "answer": "b", "language": "en", "category": "pre_sales"},
                {"question": "c", "answer": "d", "language": "ar", "category": "post_sales"},
                {"question": "e", "answer": "f", "language": "ar", "category": "pre_sales"}
            ]}"#,
        );

        let report = validate_document(&path).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.total, 3);
        assert_eq!(report.language_count(Language::Ar), 2);
        assert_eq!(report.language_count(Language::En), 1);
        assert_eq!(report.category_count(Category::PreSales), 2);
        assert_eq!(report.category_count(Category::General), 0);
    }

    #[test]
    fn test_validate_reports_missing_keys_and_bad_values() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "qa.json",
            r#"{"qa_pairs": [
                {"question": "a", "language": "fr", "category": "general"},
                {"question": "b", "answer": "c", "language": "en", "category": "support"},
                "not a pair"
            ]}"#,
        );

        let report = validate_document(&path).unwrap();
        assert!(!report.is_valid());
        assert_eq!(
            report.issues,
            vec![
                Issue::MissingKey {
                    index: 0,
                    key: "answer"
                },
                Issue::UnsupportedLanguage {
                    index: 0,
                    value: "fr".to_string()
                },
                Issue::UnsupportedCategory {
                    index: 1,
                    value: "support".to_string()
                },
                Issue::NotAnObject { index: 2 },
            ]
        );
        assert_eq!(report.issues[0].to_string(), "Q&A pair 0 missing key: answer");
    }

    #[test]
    fn test_validate_reports_values_that_do_not_load() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "qa.json",
            r#"{"qa_pairs": [
                {"question": null, "answer": "a", "language": "en", "category": "general"},
                {"question": "q", "answer": 42, "language": "ar", "category": "general"}
            ]}"#,
        );

        let report = validate_document(&path).unwrap();
        assert_eq!(report.issues.len(), 2);
        assert!(matches!(report.issues[0], Issue::Unreadable { index: 0, .. }));
        assert!(matches!(report.issues[1], Issue::Unreadable { index: 1, .. }));
    }

    #[test]
    fn test_valid_document_loads_every_pair() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "qa.json",
            r#"{"qa_pairs": [
                {"question": "a", "answer": "b", "language": "en", "category": "pre_sales"},
                {"question": "c", "answer": "d", "language": "AR", "category": "Post_Sales"}
            ]}"#,
        );

        let report = validate_document(&path).unwrap();
        assert!(report.is_valid());

        let entries = CorpusStore::new(&path, temp.path()).load();
        assert_eq!(entries.len(), report.total);
        assert_eq!(entries[1].language, Language::Ar);
        assert_eq!(entries[1].category, Category::PostSales);
    }

    #[test]
    fn test_validate_without_pairs_is_empty_and_valid() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "qa.json", "{}");

        let report = validate_document(&path).unwrap();
        assert_eq!(report.total, 0);
        assert!(report.is_valid());
    }

    #[test]
    fn test_validate_rejects_non_array_pairs() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "qa.json", r#"{"qa_pairs": {"question": "a"}}"#);
        assert!(matches!(
            validate_document(&path),
            Err(AppError::Knowledge(_))
        ));
    }
}
