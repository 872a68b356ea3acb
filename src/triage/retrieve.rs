//! Similarity retrieval over a [`KnowledgeIndex`].

use std::{cmp::Ordering, num::NonZeroUsize};

use tracing::{debug, instrument, warn};

use crate::{
    base::types::{KnowledgeChunk, RetrievalResult, RetrievedChunk},
    service::embed::similarity,
};

use super::knowledge::KnowledgeIndex;

/// Chunks at or below this similarity are never returned.
pub const SIMILARITY_FLOOR: f32 = 0.1;

/// Embed `query` and return the best `top_k` chunks above the similarity floor.
///
/// A query that cannot be embedded yields an empty result.
#[instrument(skip_all)]
pub async fn retrieve(index: &KnowledgeIndex, query: &str, top_k: NonZeroUsize) -> RetrievalResult {
    let query_embedding = match index.embedder().embed(query).await {
        Ok(embedding) => embedding,
        Err(err) => {
            warn!("Unable to embed retrieval query: {err}");
            return Vec::new();
        }
    };

    let result = rank(&query_embedding, index.chunks(), top_k);
    debug!("Retrieved {} of {} chunks.", result.len(), index.len());

    result
}

/// Rank `chunks` against an embedded query.
///
/// Ties keep chunk order.  The top `top_k` are selected first and the floor is
/// applied after, so fewer than `top_k` (or none) may come back.
pub fn rank(query_embedding: &[f32], chunks: &[KnowledgeChunk], top_k: NonZeroUsize) -> RetrievalResult {
    let mut scored = chunks.iter().map(|chunk| (chunk, similarity(query_embedding, &chunk.embedding))).collect::<Vec<_>>();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(top_k.get())
        .filter(|(_, similarity)| *similarity > SIMILARITY_FLOOR)
        .map(|(chunk, similarity)| RetrievedChunk { chunk: chunk.clone(), similarity })
        .collect()
}
