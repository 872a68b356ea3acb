//! Load configuration via `config` crate with env-override support.

use std::{num::NonZeroUsize, ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;

use crate::base::prompts;

use super::types::Res;

/// Default OpenAI drafting agent model to use
fn default_openai_drafting_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default sampling temperature for the drafting agent
fn default_openai_drafting_temperature() -> f32 {
    0.2
}

/// Default max output tokens for a drafted reply
fn default_openai_max_tokens() -> u32 {
    300
}

/// Default system directive for the drafting agent.
fn default_drafting_agent_system_directive() -> String {
    prompts::DRAFTING_AGENT_SYSTEM_DIRECTIVE.to_string()
}

fn default_embedding_provider() -> EmbeddingProvider {
    EmbeddingProvider::Hashing
}

fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_sentiment_max_chars() -> usize {
    512
}

fn default_external_timeout_secs() -> u64 {
    30
}

fn default_knowledge_base_path() -> String {
    "data/knowledge_base.txt".to_string()
}

fn default_retrieval_top_k() -> NonZeroUsize {
    NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN)
}

fn default_db_endpoint() -> String {
    "memory".to_string()
}

/// Which embedding model backs the knowledge index.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local feature-hashing embedder; needs no network.
    Hashing,
    /// OpenAI embeddings endpoint.
    OpenAi,
}

/// Configuration for the support-triage application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).  Empty disables generative drafting.
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI drafting agent model to use (`OPENAI_DRAFTING_MODEL`).
    #[serde(default = "default_openai_drafting_model")]
    pub openai_drafting_model: String,
    /// Sampling temperature to use for the drafting agent (`OPENAI_DRAFTING_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_openai_drafting_temperature")]
    pub openai_drafting_temperature: f32,
    /// Max output tokens for a drafted reply (`OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Optional custom drafting directive to override the default (`DRAFTING_AGENT_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_drafting_agent_system_directive")]
    pub drafting_agent_system_directive: String,
    /// Embedding model backing the knowledge index (`EMBEDDING_PROVIDER`).
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: EmbeddingProvider,
    /// OpenAI embedding model, when `embedding_provider = "openai"` (`OPENAI_EMBEDDING_MODEL`).
    #[serde(default = "default_openai_embedding_model")]
    pub openai_embedding_model: String,
    /// Vector width of the local hashing embedder (`EMBEDDING_DIMENSIONS`).
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    /// Text-classification endpoint for sentiment (`SENTIMENT_ENDPOINT`).  Absent means lexical only.
    #[serde(default)]
    pub sentiment_endpoint: Option<String>,
    /// Bearer token for the sentiment endpoint (`SENTIMENT_API_TOKEN`).
    #[serde(default)]
    pub sentiment_api_token: Option<String>,
    /// Characters of message text sent to the sentiment endpoint (`SENTIMENT_MAX_CHARS`).
    #[serde(default = "default_sentiment_max_chars")]
    pub sentiment_max_chars: usize,
    /// Timeout applied to every external call (`EXTERNAL_TIMEOUT_SECS`).
    #[serde(default = "default_external_timeout_secs")]
    pub external_timeout_secs: u64,
    /// Path of the knowledge base text file (`KNOWLEDGE_BASE_PATH`).
    #[serde(default = "default_knowledge_base_path")]
    pub knowledge_base_path: String,
    /// Knowledge chunks retrieved per message (`RETRIEVAL_TOP_K`).
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: NonZeroUsize,
    /// Our own mailbox address; messages from it are never triaged (`SELF_ADDRESS`).
    #[serde(default)]
    pub self_address: Option<String>,
    /// Sender domains that belong to paying customers.
    #[serde(default)]
    pub paid_customer_domains: Vec<String>,
    /// Database endpoint URL, or `memory` (`DB_ENDPOINT`).
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`).
    #[serde(default)]
    pub db_username: String,
    /// Database password (`DB_PASSWORD`).
    #[serde(default)]
    pub db_password: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_drafting_model: default_openai_drafting_model(),
            openai_drafting_temperature: default_openai_drafting_temperature(),
            openai_max_tokens: default_openai_max_tokens(),
            drafting_agent_system_directive: default_drafting_agent_system_directive(),
            embedding_provider: default_embedding_provider(),
            openai_embedding_model: default_openai_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            sentiment_endpoint: None,
            sentiment_api_token: None,
            sentiment_max_chars: default_sentiment_max_chars(),
            external_timeout_secs: default_external_timeout_secs(),
            knowledge_base_path: default_knowledge_base_path(),
            retrieval_top_k: default_retrieval_top_k(),
            self_address: None,
            paid_customer_domains: Vec::new(),
            db_endpoint: default_db_endpoint(),
            db_username: String::new(),
            db_password: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner: Arc::new(ConfigInner::default()),
        }
    }
}

impl ConfigInner {
    /// Timeout applied to each external call.
    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs)
    }

    /// Whether generative drafting can be attempted at all.
    pub fn drafting_enabled(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }
}

/// Environment source: `SUPPORT_TRIAGE_*`, with comma-separated lists for list-valued keys.
fn environment() -> config::Environment {
    config::Environment::default()
        .prefix("SUPPORT_TRIAGE")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("paid_customer_domains")
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(environment());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    fn validate(&self) -> Res<()> {
        if self.openai_drafting_temperature < 0.0 || self.openai_drafting_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI drafting temperature must be between 0 and 2."));
        }

        if self.openai_max_tokens < 1 || self.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        if self.embedding_dimensions < 1 {
            return Err(anyhow::anyhow!("Embedding dimensions must be at least 1."));
        }

        if self.sentiment_max_chars < 1 {
            return Err(anyhow::anyhow!("Sentiment max chars must be at least 1."));
        }

        if self.external_timeout_secs < 1 {
            return Err(anyhow::anyhow!("External timeout must be at least 1 second."));
        }

        Ok(())
    }
}
