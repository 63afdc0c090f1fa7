//! Persisted vector index and its staleness check.
//!
//! The index directory holds the binary index plus a JSON sidecar that
//! describes the corpus it was built from. The sidecar alone decides
//! whether the binary may be reused; anything that does not line up with
//! the live corpus sends the engine down the rebuild path.

use crate::types::QaEntry;
use crate::vector_index::FlatIndex;
use chrono::{DateTime, Utc};
use qa_agent_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "flat.index";
pub const METADATA_FILE: &str = "index_metadata.json";

/// Questions copied into the sidecar for debugging.
const SAMPLE_QUESTIONS: usize = 5;

/// Sidecar describing a persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Corpus length when the index was built
    pub qa_count: usize,

    /// Embedding dimension of every row
    pub dimension: usize,

    /// First few questions, diagnostic only
    #[serde(default)]
    pub questions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_at: Option<DateTime<Utc>>,

    /// SHA-256 over the ordered questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl IndexMetadata {
    /// Describe an index freshly built from `corpus`.
    pub fn describe(corpus: &[QaEntry], dimension: usize) -> Self {
        Self {
            qa_count: corpus.len(),
            dimension,
            questions: corpus
                .iter()
                .take(SAMPLE_QUESTIONS)
                .map(|e| e.question.clone())
                .collect(),
            built_at: Some(Utc::now()),
            fingerprint: Some(corpus_fingerprint(corpus)),
        }
    }
}

/// Digest of the corpus questions in order.
///
/// Each question is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
/// hash differently.
pub fn corpus_fingerprint(corpus: &[QaEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in corpus {
        hasher.update((entry.question.len() as u64).to_le_bytes());
        hasher.update(entry.question.as_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Why a persisted index cannot be reused.
#[derive(Debug, Clone, PartialEq)]
pub enum Staleness {
    Missing,
    Unreadable(String),
    CountChanged { stored: usize, current: usize },
    DimensionChanged { stored: usize, current: usize },
    QuestionsChanged,
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Staleness::Missing => write!(f, "no persisted index"),
            Staleness::Unreadable(reason) => write!(f, "persisted index unreadable: {}", reason),
            Staleness::CountChanged { stored, current } => {
                write!(f, "Q&A count changed ({} -> {})", stored, current)
            }
            Staleness::DimensionChanged { stored, current } => {
                write!(f, "embedding dimension changed ({} -> {})", stored, current)
            }
            Staleness::QuestionsChanged => write!(f, "corpus questions changed"),
        }
    }
}

/// Location of a persisted index on disk.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Read the sidecar; `Ok(None)` when either file is absent.
    pub fn read_metadata(&self) -> AppResult<Option<IndexMetadata>> {
        let metadata_path = self.metadata_path();
        if !metadata_path.exists() || !self.index_path().exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&metadata_path).map_err(|e| {
            AppError::Storage(format!("Failed to read {:?}: {}", metadata_path, e))
        })?;

        let metadata = serde_json::from_str(&content).map_err(|e| {
            AppError::Storage(format!("Failed to parse {:?}: {}", metadata_path, e))
        })?;

        Ok(Some(metadata))
    }

    /// Decide from the sidecar alone whether the persisted index matches.
    pub fn check(&self, corpus: &[QaEntry], dimension: usize) -> Result<IndexMetadata, Staleness> {
        let metadata = match self.read_metadata() {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return Err(Staleness::Missing),
            Err(e) => return Err(Staleness::Unreadable(e.to_string())),
        };

        if metadata.qa_count != corpus.len() {
            return Err(Staleness::CountChanged {
                stored: metadata.qa_count,
                current: corpus.len(),
            });
        }

        if metadata.dimension != dimension {
            return Err(Staleness::DimensionChanged {
                stored: metadata.dimension,
                current: dimension,
            });
        }

        // Sidecars written without a fingerprint are judged on count alone
        if let Some(ref stored) = metadata.fingerprint {
            if *stored != corpus_fingerprint(corpus) {
                return Err(Staleness::QuestionsChanged);
            }
        }

        Ok(metadata)
    }

    /// Load the persisted index if it is still valid for `corpus`.
    pub fn load_fresh(&self, corpus: &[QaEntry], dimension: usize) -> Result<FlatIndex, Staleness> {
        let metadata = self.check(corpus, dimension)?;

        let index = FlatIndex::load(&self.index_path())
            .map_err(|e| Staleness::Unreadable(e.to_string()))?;

        if index.len() != corpus.len() {
            return Err(Staleness::CountChanged {
                stored: index.len(),
                current: corpus.len(),
            });
        }

        if index.dimension() != metadata.dimension {
            return Err(Staleness::DimensionChanged {
                stored: index.dimension(),
                current: metadata.dimension,
            });
        }

        Ok(index)
    }

    /// Persist `index` together with a sidecar describing `corpus`.
    pub fn save(&self, index: &FlatIndex, corpus: &[QaEntry]) -> AppResult<IndexMetadata> {
        index.persist(&self.index_path())?;

        let metadata = IndexMetadata::describe(corpus, index.dimension());
        let json = serde_json::to_string_pretty(&metadata)?;

        fs::write(self.metadata_path(), json).map_err(|e| {
            AppError::Storage(format!(
                "Failed to write {:?}: {}",
                self.metadata_path(),
                e
            ))
        })?;

        tracing::info!("Index saved to {:?}", self.index_path());
        Ok(metadata)
    }
}
