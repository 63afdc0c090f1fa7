//! Retrieval engine: corpus + vector index + embedder.
//!
//! The engine owns the only copies of the corpus and index. Both change
//! solely through [`RetrievalEngine::train`], which appends to the corpus,
//! saves it, and then rebuilds the index from scratch. A crash between the
//! two steps leaves the corpus ahead of the persisted index; the staleness
//! check catches that on the next [`RetrievalEngine::open`].
//!
//! Callers that share an engine across tasks must serialize `train` behind
//! their own lock: training and searching are not designed to interleave.

use crate::corpus::CorpusStore;
use crate::embeddings::EmbeddingProvider;
use crate::index_store::IndexStore;
use crate::types::{KnowledgeStats, Language, QaEntry, ScoredEntry, TrainStats};
use crate::vector_index::FlatIndex;
use qa_agent_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Map a squared Euclidean distance to a similarity in (0, 1].
///
/// `1 / (1 + d)`: 1.0 at distance zero, decreasing as the distance grows.
/// This is a normalization for thresholding, not a calibrated probability.
/// Negative distances count as zero; NaN and overflow map to the smallest
/// positive similarity.
pub fn similarity_from_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        return f32::MIN_POSITIVE;
    }

    (1.0 / (1.0 + distance.max(0.0))).max(f32::MIN_POSITIVE)
}

/// Answers queries against the Q&A corpus.
#[derive(Debug)]
pub struct RetrievalEngine {
    corpus_store: CorpusStore,
    index_store: IndexStore,
    embedder: Arc<dyn EmbeddingProvider>,
    corpus: Vec<QaEntry>,
    index: Option<FlatIndex>,
}

impl RetrievalEngine {
    /// Load the corpus and reuse the persisted index, or rebuild it.
    ///
    /// Never fails: storage problems degrade to an empty corpus or a
    /// rebuild, and a failed rebuild leaves the engine without an index
    /// (every search then comes back empty).
    pub async fn open(
        corpus_store: CorpusStore,
        index_store: IndexStore,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let corpus = corpus_store.load();

        let mut engine = Self {
            corpus_store,
            index_store,
            embedder,
            corpus,
            index: None,
        };
        engine.build_or_load_index().await;
        engine
    }

    async fn build_or_load_index(&mut self) {
        if self.corpus.is_empty() {
            tracing::warn!("No Q&A pairs to index.");
            return;
        }

        match self
            .index_store
            .load_fresh(&self.corpus, self.embedder.dimensions())
        {
            Ok(index) => {
                tracing::info!("Loaded existing index with {} rows", index.len());
                self.index = Some(index);
            }
            Err(reason) => {
                tracing::info!("Rebuilding index: {}", reason);
                if let Err(e) = self.rebuild_index().await {
                    tracing::error!("Failed to build index: {}", e);
                }
            }
        }
    }

    /// Re-embed every question in corpus order and replace the index.
    ///
    /// Returns the number of indexed rows. The in-memory index is dropped
    /// before embedding starts, so on error the engine has no index.
    pub async fn rebuild_index(&mut self) -> AppResult<usize> {
        self.index = None;

        if self.corpus.is_empty() {
            return Ok(0);
        }

        let questions: Vec<String> = self.corpus.iter().map(|e| e.question.clone()).collect();

        tracing::info!(
            "Generating embeddings for {} questions using {} ({})",
            questions.len(),
            self.embedder.provider_name(),
            self.embedder.model_name()
        );

        let vectors = self
            .embedder
            .embed_batch(&questions)
            .await
            .map_err(embedding_failure)?;

        if vectors.len() != questions.len() {
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} questions",
                vectors.len(),
                questions.len()
            )));
        }

        let index = FlatIndex::build(&vectors)?;

        if index.dimension() != self.embedder.dimensions() {
            return Err(AppError::DimensionMismatch {
                expected: self.embedder.dimensions(),
                found: index.dimension(),
            });
        }

        // The in-memory index is valid even if it cannot be written
        if let Err(e) = self.index_store.save(&index, &self.corpus) {
            tracing::warn!("Failed to persist index: {}", e);
        }

        let rows = index.len();
        self.index = Some(index);
        tracing::info!("Index built with {} rows", rows);

        Ok(rows)
    }

    /// Ranked matches for `query`, surfacing why a search could not run.
    ///
    /// The index is asked for `top_k` rows and the language filter is
    /// applied afterwards, so a filtered search can return fewer than
    /// `top_k` results (possibly none) when the other language dominates
    /// the nearest rows. Widen `top_k` when both languages must be covered.
    ///
    /// # Errors
    /// * `AppError::EmptyIndex` - there is no index (empty corpus or failed build)
    /// * `AppError::Embedding` - the query could not be embedded
    /// * `AppError::DimensionMismatch` - the query vector does not fit the index
    pub async fn try_search(
        &self,
        query: &str,
        top_k: usize,
        language: Option<Language>,
    ) -> AppResult<Vec<ScoredEntry>> {
        let index = self.index.as_ref().ok_or(AppError::EmptyIndex)?;

        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(query)
            .await
            .map_err(embedding_failure)?;

        let neighbors = index.search(&query_vector, top_k)?;

        let results: Vec<ScoredEntry> = neighbors
            .into_iter()
            .filter_map(|n| {
                // Rows past the corpus end mean the index diverged; skip them
                let entry = self.corpus.get(n.row)?;
                Some(ScoredEntry::from_entry(
                    entry,
                    n.row,
                    n.distance,
                    similarity_from_distance(n.distance),
                ))
            })
            .filter(|r| language.map_or(true, |l| r.language == l))
            .collect();

        tracing::debug!(
            "Search returned {} results (top_k={}, language={:?})",
            results.len(),
            top_k,
            language
        );

        Ok(results)
    }

    /// Ranked matches for `query`; any failure is logged and yields no results.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        language: Option<Language>,
    ) -> Vec<ScoredEntry> {
        match self.try_search(query, top_k, language).await {
            Ok(results) => results,
            Err(AppError::EmptyIndex) => {
                tracing::warn!("Knowledge base is empty or index not built.");
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Error during search: {}", e);
                Vec::new()
            }
        }
    }

    /// The single nearest entry, if its similarity reaches `threshold`.
    pub async fn best_match(
        &self,
        query: &str,
        language: Option<Language>,
        threshold: f32,
    ) -> Option<ScoredEntry> {
        self.search(query, 1, language)
            .await
            .into_iter()
            .next()
            .filter(|r| r.similarity >= threshold)
    }

    /// Answer text of [`RetrievalEngine::best_match`].
    ///
    /// `None` is a normal outcome: the caller should fall back to a canned
    /// response.
    pub async fn best_answer(
        &self,
        query: &str,
        language: Option<Language>,
        threshold: f32,
    ) -> Option<String> {
        self.best_match(query, language, threshold)
            .await
            .map(|r| r.answer)
    }

    /// Append entries, save the corpus, and rebuild the whole index.
    ///
    /// Identical entries are not deduplicated. A failed corpus save is
    /// logged, reported through [`TrainStats::persisted`], and training
    /// continues in memory.
    ///
    /// # Errors
    /// * `AppError::Embedding` / `AppError::DimensionMismatch` - the rebuild failed;
    ///   the engine is left without an index
    pub async fn train(&mut self, new_entries: Vec<QaEntry>) -> AppResult<TrainStats> {
        let start = Instant::now();
        let added = new_entries.len();

        for entry in &new_entries {
            tracing::debug!("Added Q&A pair: {}", truncate(&entry.question, 50));
        }
        self.corpus.extend(new_entries);

        let persisted = match self.corpus_store.save(&self.corpus) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving Q&A database: {}", e);
                false
            }
        };

        let index_rows = self.rebuild_index().await?;

        tracing::info!("Training completed with {} Q&A pairs.", added);

        Ok(TrainStats {
            added,
            total: self.corpus.len(),
            index_rows,
            persisted,
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }

    pub fn corpus(&self) -> &[QaEntry] {
        &self.corpus
    }

    /// Rows in the live index (0 without one).
    pub fn index_rows(&self) -> usize {
        self.index.as_ref().map_or(0, FlatIndex::len)
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn stats(&self) -> KnowledgeStats {
        let mut by_language = BTreeMap::new();
        let mut by_category = BTreeMap::new();
        for entry in &self.corpus {
            *by_language.entry(entry.language).or_insert(0) += 1;
            *by_category.entry(entry.category).or_insert(0) += 1;
        }

        KnowledgeStats {
            entries: self.corpus.len(),
            by_language,
            by_category,
            index_rows: self.index_rows(),
            dimension: self.embedder.dimensions(),
            provider: self.embedder.provider_name().to_string(),
            model: self.embedder.model_name().to_string(),
        }
    }
}

fn embedding_failure(err: AppError) -> AppError {
    match err {
        AppError::Embedding(_) | AppError::DimensionMismatch { .. } => err,
        other => AppError::Embedding(other.to_string()),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
