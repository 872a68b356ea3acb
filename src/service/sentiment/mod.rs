//! External sentiment classification services.

pub mod http;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, SentimentPrediction, Void};

/// Text sent when checking a sentiment capability.
pub const HEALTH_CHECK_TEXT: &str = "Thank you for your help.";

// Traits.

/// Generic sentiment classification trait that clients must implement.
#[async_trait]
pub trait GenericSentimentClient: Send + Sync + 'static {
    /// Classify a (pre-truncated) text.
    async fn classify(&self, text: &str) -> Res<SentimentPrediction>;

    /// Check that the capability answers at all.
    ///
    /// Called once when a classifier is constructed, never per message.
    async fn health_check(&self) -> Void {
        self.classify(HEALTH_CHECK_TEXT).await.map(|_| ())
    }
}

// Structs.

/// Sentiment client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct SentimentClient {
    inner: Arc<dyn GenericSentimentClient>,
}

impl Deref for SentimentClient {
    type Target = dyn GenericSentimentClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl SentimentClient {
    pub fn new(inner: Arc<dyn GenericSentimentClient>) -> Self {
        Self { inner }
    }
}
