//! Local feature-hashing embedder.
//!
//! Produces deterministic dense vectors by hashing terms into fixed-dimension
//! buckets weighted by term frequency.  No network and no model files, so it is
//! always available and is the fallback for every other embedder.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

use super::{EmbeddingClient, GenericEmbedder};

/// Terms too common to carry meaning in support text.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "do", "for", "from", "has", "have", "i", "if", "in", "is", "it", "its", "me", "my", "of", "on", "or", "our", "so", "that", "the", "their",
    "this", "to", "was", "we", "were", "will", "with", "you", "your",
];

// Extra methods on `EmbeddingClient` applied by the hashing implementation.

impl EmbeddingClient {
    pub fn hashing(dimensions: usize) -> Self {
        Self::new(Arc::new(HashingEmbedder::new(dimensions)))
    }
}

/// Feature-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed one text.  Empty or stop-word-only text yields the zero vector.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let tokens = tokenize(text);
        let mut vector = vec![0.0f32; self.dimensions];

        if tokens.is_empty() {
            return vector;
        }

        let mut tf: BTreeMap<&str, f32> = BTreeMap::new();
        for token in &tokens {
            *tf.entry(token.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in tf {
            // Longer terms are rarer; a cheap stand-in for IDF.
            let idf = 1.0 + (term.len() as f32).ln();
            vector[hash_term(term, self.dimensions)] += (count / total) * idf;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            vector.iter_mut().for_each(|x| *x /= norm);
        }

        vector
    }
}

#[async_trait]
impl GenericEmbedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed_batch(&self, texts: &[String]) -> Res<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vector(text)).collect())
    }
}

// Helpers.

/// FNV-1a bucket of a term.
fn hash_term(term: &str, dimensions: usize) -> usize {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in term.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    (h % dimensions as u64) as usize
}

/// Lower-cased alphanumeric terms, minus stop words, with a plural `s` folded away.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.len() >= 2)
        .map(|s| s.to_lowercase())
        .filter(|s| !STOP_WORDS.contains(&s.as_str()))
        .map(|s| if s.len() > 3 && s.ends_with('s') && !s.ends_with("ss") { s[..s.len() - 1].to_string() } else { s })
        .collect()
}
