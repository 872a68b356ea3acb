//! The per-message triage pipeline.

use std::{num::NonZeroUsize, path::Path, sync::Arc};

use tracing::{info, instrument};

use crate::{
    base::{
        config::{Config, EmbeddingProvider},
        types::{RawMessage, TriageOutcome},
    },
    service::{embed::EmbeddingClient, llm::LlmClient, sentiment::SentimentClient},
};

use super::{
    compose::Composer,
    extract::extract,
    knowledge::KnowledgeIndex,
    priority,
    retrieve::retrieve,
    sentiment::SentimentClassifier,
    summary::summarize,
};

/// Triage engine.
///
/// Trivially cloneable; every clone shares the same read-only knowledge index.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    classifier: SentimentClassifier,
    index: Arc<KnowledgeIndex>,
    composer: Composer,
    top_k: NonZeroUsize,
}

impl Engine {
    /// Build the engine and its external capabilities from `config`.
    ///
    /// Never fails: every capability that cannot be reached is replaced by its
    /// local fallback.
    #[instrument(name = "Engine::from_config", skip_all)]
    pub async fn from_config(config: &Config) -> Self {
        let classifier = SentimentClassifier::new(SentimentClient::http(config), config.sentiment_max_chars, config.external_timeout()).await;

        let embedder = match config.embedding_provider {
            EmbeddingProvider::Hashing => EmbeddingClient::hashing(config.embedding_dimensions),
            EmbeddingProvider::OpenAi => EmbeddingClient::openai(config),
        };
        let index = KnowledgeIndex::load(Path::new(&config.knowledge_base_path), embedder, config.embedding_dimensions).await;

        let llm = config.drafting_enabled().then(|| LlmClient::openai(config));
        if llm.is_none() {
            info!("No OpenAI API key configured; replies will use the template.");
        }
        let composer = Composer::new(llm, config.external_timeout());

        Self::from_parts(classifier, Arc::new(index), composer, config.retrieval_top_k)
    }

    pub fn from_parts(classifier: SentimentClassifier, index: Arc<KnowledgeIndex>, composer: Composer, top_k: NonZeroUsize) -> Self {
        Self {
            inner: Arc::new(EngineInner { classifier, index, composer, top_k }),
        }
    }

    pub fn index(&self) -> &KnowledgeIndex {
        &self.inner.index
    }

    /// Triage one message.
    ///
    /// Extraction and sentiment run concurrently; scoring waits on both, then the
    /// knowledge base is queried and a reply drafted.
    #[instrument(name = "Engine::process", skip_all, fields(message_id = %message.id))]
    pub async fn process(&self, message: &RawMessage, is_paid_customer: bool) -> TriageOutcome {
        let inner = &self.inner;
        let text = message.triage_text();

        let (signals, sentiment) = tokio::join!(async { extract(&text) }, inner.classifier.classify(&text));

        let assessment = priority::score(&text, sentiment, &signals, is_paid_customer);
        let retrieval = retrieve(&inner.index, &message.retrieval_query(), inner.top_k).await;
        let draft = inner.composer.compose(message, &assessment, sentiment, &signals, &retrieval).await;

        info!("Triaged as {} ({}), sentiment {}, {} knowledge chunks.", assessment.label, assessment.score, sentiment, retrieval.len());

        TriageOutcome {
            message_id: message.id.clone(),
            sentiment,
            summary: summarize(&text),
            knowledge_headers: retrieval.iter().map(|r| r.chunk.header.clone()).collect(),
            signals,
            assessment,
            draft,
        }
    }
}
