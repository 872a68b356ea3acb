//! OpenAI embeddings endpoint.

use std::{sync::Arc, time::Duration};

use async_openai::{Client, config::OpenAIConfig, types::CreateEmbeddingRequestArgs};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, instrument};

use crate::base::{config::Config, types::Res};

use super::{EmbeddingClient, GenericEmbedder};

// Extra methods on `EmbeddingClient` applied by the openai implementation.

impl EmbeddingClient {
    pub fn openai(config: &Config) -> Self {
        Self::new(Arc::new(OpenAiEmbedder::new(config)))
    }
}

/// OpenAI embedder implementation.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiEmbedder {
    #[instrument(name = "OpenAiEmbedder::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            model: config.openai_embedding_model.clone(),
            timeout: config.external_timeout(),
        }
    }
}

#[async_trait]
impl GenericEmbedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(name = "OpenAiEmbedder::embed_batch", skip_all)]
    async fn embed_batch(&self, texts: &[String]) -> Res<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default().model(&self.model).input(texts.to_vec()).build()?;

        let response = timeout(self.timeout, self.client.embeddings().create(request))
            .await
            .map_err(|_| anyhow::anyhow!("OpenAI embeddings call timed out after {:?}", self.timeout))??;

        debug!("Received {} embeddings from `{}`.", response.data.len(), self.model);

        if response.data.len() != texts.len() {
            return Err(anyhow::anyhow!("OpenAI returned {} embeddings for {} inputs.", response.data.len(), texts.len()));
        }

        let mut data = response.data;
        data.sort_by_key(|embedding| embedding.index);

        Ok(data.into_iter().map(|embedding| embedding.embedding).collect())
    }
}
