//! Text embedding services.
//!
//! Retrieval only ever talks to the `GenericEmbedder` trait and [`similarity`], so the
//! model behind the knowledge index can be swapped without touching ranking logic.

pub mod hashing;
pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic embedding trait that clients must implement.
#[async_trait]
pub trait GenericEmbedder: Send + Sync + 'static {
    /// A short name identifying the model, used in logs.
    fn name(&self) -> &str;

    /// Embed a batch of texts, returning one vector per text, in order.
    async fn embed_batch(&self, texts: &[String]) -> Res<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Res<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;

        vectors.pop().ok_or_else(|| anyhow::anyhow!("Embedder `{}` returned no vector.", self.name()))
    }
}

// Structs.

/// Embedding client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct EmbeddingClient {
    inner: Arc<dyn GenericEmbedder>,
}

impl Deref for EmbeddingClient {
    type Target = dyn GenericEmbedder;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl EmbeddingClient {
    pub fn new(inner: Arc<dyn GenericEmbedder>) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient").field("name", &self.name()).finish()
    }
}

// Helpers.

/// Cosine similarity between two vectors, clamped to `[-1, 1]`.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut mag_a, mut mag_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom < f64::EPSILON { 0.0 } else { (dot / denom).clamp(-1.0, 1.0) as f32 }
}
