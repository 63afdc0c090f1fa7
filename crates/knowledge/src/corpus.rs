//! Durable storage for the Q&A corpus.
//!
//! The corpus is a single JSON document `{"qa_pairs": [...]}` rewritten in
//! full on every save. A missing or damaged document loads as an empty
//! corpus; a pair that does not load is skipped without dropping the rest.

use crate::types::QaEntry;
use qa_agent_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// On-disk shape of the corpus (and of training files).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusDocument {
    #[serde(default)]
    pub qa_pairs: Vec<QaEntry>,
}

/// Reads a Q&A document, failing on any I/O or parse problem.
pub fn read_document(path: &Path) -> AppResult<CorpusDocument> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Storage(format!("Failed to read {:?}: {}", path, e)))?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::Storage(format!("Failed to parse {:?}: {}", path, e)))
}

/// A document read pair by pair.
#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    qa_pairs: Vec<Value>,
}

/// The corpus document plus the directory it is allowed to live in.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    path: PathBuf,
    authorized_root: PathBuf,
}

impl CorpusStore {
    /// `path` may be supplied externally; writes are refused unless it
    /// resolves inside `authorized_root`.
    pub fn new(path: impl Into<PathBuf>, authorized_root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            authorized_root: authorized_root.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the corpus, falling back to an empty one on any failure.
    pub fn load(&self) -> Vec<QaEntry> {
        if !self.path.exists() {
            tracing::warn!(
                "Q&A database not found at {:?}. Starting with empty database.",
                self.path
            );
            return Vec::new();
        }

        let document = match read_raw_document(&self.path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Error loading Q&A database: {}. Starting empty.", e);
                return Vec::new();
            }
        };

        let mut entries = Vec::with_capacity(document.qa_pairs.len());
        for (index, pair) in document.qa_pairs.into_iter().enumerate() {
            match serde_json::from_value::<QaEntry>(pair) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Skipping Q&A pair {}: {}", index, e),
            }
        }

        tracing::info!("Loaded {} Q&A pairs from database.", entries.len());
        entries
    }

    /// Rewrite the whole document with `entries`.
    ///
    /// # Errors
    /// * `AppError::Storage` - the path escapes the authorized root, or the write failed
    pub fn save(&self, entries: &[QaEntry]) -> AppResult<()> {
        let target = self.authorized_target()?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }

        let document = CorpusDocument {
            qa_pairs: entries.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        let tmp_path = target.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .and_then(|_| fs::rename(&tmp_path, &target))
            .map_err(|e| AppError::Storage(format!("Failed to write {:?}: {}", target, e)))?;

        tracing::info!("Saved {} Q&A pairs to database.", entries.len());
        Ok(())
    }

    fn authorized_target(&self) -> AppResult<PathBuf> {
        let target = resolve_links(&normalize_path(&self.path)?)?;
        let root = resolve_links(&normalize_path(&self.authorized_root)?)?;

        if target == root || !target.starts_with(&root) {
            return Err(AppError::Storage(format!(
                "Invalid path: {:?} is outside {:?}",
                self.path, self.authorized_root
            )));
        }

        Ok(target)
    }
}

fn read_raw_document(path: &Path) -> AppResult<RawDocument> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Storage(format!("Failed to read {:?}: {}", path, e)))?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::Storage(format!("Failed to parse {:?}: {}", path, e)))
}

/// Canonicalize the deepest part of `path` that exists (symlinks included)
/// and re-append the components that do not exist yet.
fn resolve_links(path: &Path) -> AppResult<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    while fs::symlink_metadata(existing).is_err() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(path.to_path_buf()),
        }
    }

    let mut resolved = fs::canonicalize(existing).map_err(|e| {
        AppError::Storage(format!("Failed to resolve {:?}: {}", existing, e))
    })?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }

    Ok(resolved)
}

/// Make `path` absolute and resolve `.` and `..` without touching the
/// filesystem, so paths that do not exist yet can still be checked.
pub fn normalize_path(path: &Path) -> AppResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    Ok(normalized)
}
