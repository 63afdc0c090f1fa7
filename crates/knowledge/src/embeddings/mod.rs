//! Embedding providers for the knowledge base.
//!
//! The retrieval engine treats the embedder as an opaque capability: any
//! provider that is deterministic and dimensionally stable can back it.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
