//! Q&A knowledge base.
//!
//! Embeds corpus questions, keeps an exact (flat) vector index over them,
//! and answers queries with the nearest entries plus a similarity score.

pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod engine;
pub mod index_store;
pub mod training;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::KnowledgeBaseConfig;
pub use corpus::{CorpusDocument, CorpusStore};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use engine::{similarity_from_distance, RetrievalEngine};
pub use index_store::{IndexMetadata, IndexStore, Staleness};
pub use training::{load_training_file, validate_document, ValidationReport};
pub use types::{Category, KnowledgeStats, Language, QaEntry, ScoredEntry, TrainStats};
pub use vector_index::{FlatIndex, Neighbor};
