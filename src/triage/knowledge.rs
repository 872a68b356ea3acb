//! Knowledge base indexing.
//!
//! The source is plain text made of `HEADER:` lines, each followed by a body of
//! `- ` bullet points.  Every point becomes one chunk tagged with its header.
//! Building never fails: a missing or empty source degrades to a single default
//! chunk, and an embedder failure degrades to the local hashing embedder.

use std::{path::Path, sync::OnceLock};

use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{KnowledgeChunk, embeddable_text},
    service::embed::EmbeddingClient,
};

/// Header of the chunk used when the source yields nothing.
pub const DEFAULT_HEADER: &str = "GENERAL";

/// Text of the chunk used when the source yields nothing.
pub const DEFAULT_CHUNK_TEXT: &str = "General support information available.";

/// The embedded knowledge base.
///
/// Owns its chunks and the embedder that produced their vectors, so queries are
/// always embedded into the same space.  Never mutated after construction.
#[derive(Debug)]
pub struct KnowledgeIndex {
    chunks: Vec<KnowledgeChunk>,
    embedder: EmbeddingClient,
}

impl KnowledgeIndex {
    /// Read and index the knowledge source at `path`.
    #[instrument(name = "KnowledgeIndex::load", skip(embedder, fallback_dimensions))]
    pub async fn load(path: &Path, embedder: EmbeddingClient, fallback_dimensions: usize) -> Self {
        let source = match tokio::fs::read_to_string(path).await {
            Ok(source) => source,
            Err(err) => {
                warn!("Unable to read knowledge base `{}`: {err}", path.display());
                String::new()
            }
        };

        Self::build(&source, embedder, fallback_dimensions).await
    }

    /// Index `source`.
    #[instrument(name = "KnowledgeIndex::build", skip_all)]
    pub async fn build(source: &str, embedder: EmbeddingClient, fallback_dimensions: usize) -> Self {
        let mut points = parse_points(source);

        if points.is_empty() {
            warn!("Knowledge base yielded no chunks; using the default chunk.");
            points.push((DEFAULT_HEADER.to_string(), DEFAULT_CHUNK_TEXT.to_string()));
        }

        let texts = points.iter().map(|(header, text)| embeddable_text(header, text)).collect::<Vec<_>>();

        let (embedder, embeddings) = match embedder.embed_batch(&texts).await {
            Ok(embeddings) if embeddings.len() == texts.len() => (embedder, embeddings),
            Ok(embeddings) => {
                warn!("Embedder `{}` returned {} vectors for {} chunks; using the hashing embedder.", embedder.name(), embeddings.len(), texts.len());
                hashing_fallback(&texts, fallback_dimensions).await
            }
            Err(err) => {
                warn!("Embedder `{}` failed, using the hashing embedder: {err}", embedder.name());
                hashing_fallback(&texts, fallback_dimensions).await
            }
        };

        let chunks = points
            .into_iter()
            .zip(embeddings)
            .map(|((header, text), embedding)| KnowledgeChunk { header, text, embedding })
            .collect::<Vec<_>>();

        info!("Knowledge index built with {} chunks using `{}`.", chunks.len(), embedder.name());

        Self { chunks, embedder }
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    pub fn embedder(&self) -> &EmbeddingClient {
        &self.embedder
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false; an index holds at least the default chunk.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

async fn hashing_fallback(texts: &[String], dimensions: usize) -> (EmbeddingClient, Vec<Vec<f32>>) {
    let embedder = EmbeddingClient::hashing(dimensions);
    let embeddings = match embedder.embed_batch(texts).await {
        Ok(embeddings) => embeddings,
        Err(err) => {
            warn!("Hashing embedder failed: {err}");
            vec![Vec::new(); texts.len()]
        }
    };

    (embedder, embeddings)
}

/// Split a knowledge source into `(header, point)` pairs, in source order.
pub fn parse_points(source: &str) -> Vec<(String, String)> {
    let mut points = Vec::new();
    let mut header: Option<String> = None;
    let mut current: Option<String> = None;

    let mut flush = |header: &Option<String>, current: &mut Option<String>| {
        if let (Some(header), Some(point)) = (header, current.take()) {
            let point = point.trim().to_string();
            if !point.is_empty() {
                points.push((header.clone(), point));
            }
        }
    };

    for line in source.lines() {
        let trimmed = line.trim();

        if header_regex().is_match(trimmed) {
            flush(&header, &mut current);
            header = Some(trimmed.trim_end_matches(':').trim().to_string());
            continue;
        }

        if header.is_none() || trimmed.is_empty() {
            continue;
        }

        if let Some(bullet) = trimmed.strip_prefix("- ").or_else(|| (trimmed == "-").then_some("")) {
            flush(&header, &mut current);
            current = Some(bullet.to_string());
        } else {
            match current.as_mut() {
                Some(point) => {
                    point.push(' ');
                    point.push_str(trimmed);
                }
                None => current = Some(trimmed.to_string()),
            }
        }
    }

    flush(&header, &mut current);

    points
}

static HEADER_RE: OnceLock<Regex> = OnceLock::new();

fn header_regex() -> &'static Regex {
    HEADER_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z &]*:$").expect("header regex must compile"))
}
