//! Deterministic embedders and workspace fixtures for engine tests.

use crate::corpus::CorpusStore;
use crate::embeddings::EmbeddingProvider;
use crate::engine::RetrievalEngine;
use crate::index_store::IndexStore;
use crate::types::{Category, Language, QaEntry};
use qa_agent_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Looks texts up in a fixed table; unknown texts map to the last axis.
#[derive(Debug)]
pub struct TableEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
    embedded: AtomicUsize,
}

impl TableEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
            embedded: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dimensions);
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Texts embedded so far, across all calls.
    pub fn embedded(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TableEmbedder {
    fn provider_name(&self) -> &str {
        "table"
    }

    fn model_name(&self) -> &str {
        "table-test"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| {
                self.vectors.get(t).cloned().unwrap_or_else(|| {
                    let mut v = vec![0.0; self.dimensions];
                    v[self.dimensions - 1] = 1.0;
                    v
                })
            })
            .collect())
    }
}

/// Always fails, like an unreachable inference server.
#[derive(Debug)]
pub struct FailingEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        4
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Embedding("model unavailable".to_string()))
    }
}

/// A temporary workspace with the default storage layout.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.temp.path().join("data/qa_database.json")
    }

    pub fn corpus_store(&self) -> CorpusStore {
        CorpusStore::new(self.corpus_path(), self.temp.path())
    }

    pub fn index_store(&self) -> IndexStore {
        IndexStore::new(self.temp.path().join("data/vector_db"))
    }

    pub async fn open(&self, embedder: Arc<dyn EmbeddingProvider>) -> RetrievalEngine {
        RetrievalEngine::open(self.corpus_store(), self.index_store(), embedder).await
    }
}

pub fn entry(question: &str, answer: &str, language: Language) -> QaEntry {
    QaEntry::new(question, answer, language, Category::General)
}
