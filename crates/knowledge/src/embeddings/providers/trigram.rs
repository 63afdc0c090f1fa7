//! Trigram embedding provider using character trigram-based content-aware embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use qa_agent_core::AppResult;
use std::collections::{BTreeMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "you", "your", "can", "does", "did", "what", "how",
];

const ARABIC_STOP_WORDS: &[&str] = &[
    "في", "من", "على", "إلى", "عن", "مع", "هل", "ما", "ماذا", "هذا", "هذه", "التي", "الذي", "أو",
    "ثم", "كيف", "لدي", "لديكم", "هو", "هي",
];

/// Trigram-based embedding provider for local, offline operation.
///
/// Generates deterministic embeddings from character trigrams and word
/// frequencies. Words are found with Unicode word segmentation, so Arabic
/// and English text are handled the same way. Not semantically accurate
/// like neural embedding models, but consistent and content-dependent.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
    stop_words: HashSet<&'static str>,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            stop_words: ENGLISH_STOP_WORDS
                .iter()
                .chain(ARABIC_STOP_WORDS)
                .copied()
                .collect(),
        }
    }

    /// Generate a trigram-based embedding for text.
    fn generate_trigram_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();

        let mut word_freq =
            count_words(&lower, |w| !self.stop_words.contains(w) && w.chars().count() > 2);

        // Text made only of stop words or short words keeps its raw words,
        // and text without words keeps itself, so only blank text is zero
        if word_freq.is_empty() {
            word_freq = count_words(&lower, |_| true);
        }
        if word_freq.is_empty() && !lower.trim().is_empty() {
            word_freq.insert(lower.trim(), 1);
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim_idx = bucket(&trigram, 37, self.dimensions);
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            let base_dim = bucket(word, 31, self.dimensions);
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

/// Word frequencies, ordered so float accumulation is stable across runs.
fn count_words<'a>(text: &'a str, keep: impl Fn(&str) -> bool) -> BTreeMap<&'a str, u32> {
    let mut word_freq = BTreeMap::new();
    for word in text.unicode_words().filter(|w| keep(*w)) {
        *word_freq.entry(word).or_insert(0) += 1;
    }
    word_freq
}

fn bucket(feature: &str, multiplier: u64, dimensions: usize) -> usize {
    let hash = feature
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64));
    (hash % dimensions as u64) as usize
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_trigram_embedding(text))
            .collect())
    }
}
