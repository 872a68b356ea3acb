//! Hosted text-classification endpoint (Hugging Face inference style).
//!
//! The endpoint receives `{"inputs": "<text>"}` and answers with either a flat list
//! of `{label, score}` candidates or a list of such lists (one per input).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{Res, SentimentPrediction},
};

use super::{GenericSentimentClient, SentimentClient};

// Extra methods on `SentimentClient` applied by the http implementation.

impl SentimentClient {
    /// Creates a sentiment client for the configured endpoint, if there is one.
    pub fn http(config: &Config) -> Option<Self> {
        let endpoint = config.sentiment_endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        let client = HttpSentimentClient::new(endpoint, config.sentiment_api_token.clone());

        Some(Self::new(Arc::new(client)))
    }
}

/// HTTP sentiment client implementation.
#[derive(Clone)]
pub struct HttpSentimentClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpSentimentClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            token,
        }
    }
}

#[async_trait]
impl GenericSentimentClient for HttpSentimentClient {
    #[instrument(name = "HttpSentimentClient::classify", skip_all)]
    async fn classify(&self, text: &str) -> Res<SentimentPrediction> {
        let mut request = self.client.post(&self.endpoint).json(&serde_json::json!({ "inputs": text }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let payload: ClassificationPayload = response.json().await?;

        let prediction = payload.best().ok_or_else(|| anyhow::anyhow!("Sentiment endpoint returned no labels."))?;
        debug!("Sentiment endpoint answered `{}` ({:.2}).", prediction.label, prediction.score);

        Ok(prediction)
    }
}

// Helpers.

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationPayload {
    Nested(Vec<Vec<SentimentPrediction>>),
    Flat(Vec<SentimentPrediction>),
    Single(SentimentPrediction),
}

impl ClassificationPayload {
    /// The highest-scoring candidate.
    fn best(self) -> Option<SentimentPrediction> {
        let candidates = match self {
            ClassificationPayload::Nested(lists) => lists.into_iter().next().unwrap_or_default(),
            ClassificationPayload::Flat(list) => list,
            ClassificationPayload::Single(prediction) => vec![prediction],
        };

        candidates.into_iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }
}
