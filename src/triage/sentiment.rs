//! Sentiment classification.
//!
//! The strategy is fixed when the classifier is built: if a model capability is
//! supplied and passes a health check, it is the primary strategy; otherwise every call
//! uses the lexical scorer.  A primary call that errors or times out answers that
//! call lexically; the capability is never re-checked.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{Sentiment, truncate_chars},
    service::sentiment::SentimentClient,
};

use super::lexicon::{NEGATIVE_SENTIMENT_CUES, POSITIVE_SENTIMENT_CUES, count_occurrences};

#[derive(Clone)]
enum Strategy {
    Model { client: SentimentClient, max_chars: usize, timeout: Duration },
    Lexical,
}

/// Sentiment classifier, cheap to clone.
#[derive(Clone)]
pub struct SentimentClassifier {
    strategy: Strategy,
}

impl SentimentClassifier {
    /// Build a classifier, health-checking `client` once.
    #[instrument(name = "SentimentClassifier::new", skip_all)]
    pub async fn new(client: Option<SentimentClient>, max_chars: usize, limit: Duration) -> Self {
        let Some(client) = client else {
            info!("No sentiment model configured; using lexical sentiment.");
            return Self::lexical();
        };

        match timeout(limit, client.health_check()).await {
            Ok(Ok(())) => {
                info!("Sentiment model is available.");
                Self {
                    strategy: Strategy::Model { client, max_chars, timeout: limit },
                }
            }
            Ok(Err(err)) => {
                warn!("Sentiment model health check failed, using lexical sentiment: {err}");
                Self::lexical()
            }
            Err(_) => {
                warn!("Sentiment model health check timed out after {limit:?}, using lexical sentiment.");
                Self::lexical()
            }
        }
    }

    /// A classifier that only ever uses the lexical scorer.
    pub fn lexical() -> Self {
        Self { strategy: Strategy::Lexical }
    }

    pub fn uses_model(&self) -> bool {
        matches!(self.strategy, Strategy::Model { .. })
    }

    #[instrument(name = "SentimentClassifier::classify", skip_all)]
    pub async fn classify(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::Neutral;
        }

        let Strategy::Model { client, max_chars, timeout: limit } = &self.strategy else {
            return lexical_sentiment(text);
        };

        let prefix = truncate_chars(text, *max_chars);

        match timeout(*limit, client.classify(prefix)).await {
            Ok(Ok(prediction)) => label_to_sentiment(&prediction.label),
            Ok(Err(err)) => {
                warn!("Sentiment model failed, answering lexically: {err}");
                lexical_sentiment(text)
            }
            Err(_) => {
                warn!("Sentiment model timed out after {limit:?}, answering lexically.");
                lexical_sentiment(text)
            }
        }
    }
}

/// Map a model label onto the fixed label set by prefix.
pub fn label_to_sentiment(label: &str) -> Sentiment {
    let label = label.trim().to_lowercase();

    if label.starts_with("neg") {
        Sentiment::Negative
    } else if label.starts_with("pos") {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

/// Cue-counting sentiment; needs no external capability.
pub fn lexical_sentiment(text: &str) -> Sentiment {
    let lowered = text.to_lowercase();
    let negative = count_occurrences(&lowered, NEGATIVE_SENTIMENT_CUES);
    let positive = count_occurrences(&lowered, POSITIVE_SENTIMENT_CUES);

    if negative > positive && negative > 0 {
        Sentiment::Negative
    } else if positive > negative && positive > 0 {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        base::types::{Res, SentimentPrediction},
        service::sentiment::GenericSentimentClient,
    };

    /// Answers with a fixed label, or fails every call after the health check.
    struct FixedSentiment {
        label: &'static str,
        fail_after_check: bool,
        calls: AtomicUsize,
        longest_input: AtomicUsize,
    }

    impl FixedSentiment {
        fn new(label: &'static str, fail_after_check: bool) -> Arc<Self> {
            Arc::new(Self {
                label,
                fail_after_check,
                calls: AtomicUsize::new(0),
                longest_input: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenericSentimentClient for FixedSentiment {
        async fn classify(&self, text: &str) -> Res<SentimentPrediction> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.longest_input.fetch_max(text.chars().count(), Ordering::SeqCst);

            if self.fail_after_check && call > 0 {
                return Err(anyhow::anyhow!("model unavailable"));
            }

            Ok(SentimentPrediction { label: self.label.to_string(), score: 0.99 })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl GenericSentimentClient for Unreachable {
        async fn classify(&self, _text: &str) -> Res<SentimentPrediction> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[test]
    fn test_lexical_sentiment() {
        assert_eq!(lexical_sentiment("I cannot log in and I am frustrated"), Sentiment::Negative);
        assert_eq!(lexical_sentiment("Thanks, it is fixed and working great"), Sentiment::Positive);
        assert_eq!(lexical_sentiment("What are your opening hours"), Sentiment::Neutral);
        // One of each cancels out.
        assert_eq!(lexical_sentiment("good but an error"), Sentiment::Neutral);
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(label_to_sentiment("NEGATIVE"), Sentiment::Negative);
        assert_eq!(label_to_sentiment("positive"), Sentiment::Positive);
        assert_eq!(label_to_sentiment("LABEL_1"), Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_empty_text_is_neutral() {
        let classifier = SentimentClassifier::new(Some(SentimentClient::new(FixedSentiment::new("NEGATIVE", false))), 512, Duration::from_secs(1)).await;

        assert_eq!(classifier.classify("   ").await, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_model_strategy_maps_labels_and_truncates() {
        let model = FixedSentiment::new("NEGATIVE", false);
        let classifier = SentimentClassifier::new(Some(SentimentClient::new(model.clone())), 16, Duration::from_secs(1)).await;

        assert!(classifier.uses_model());
        // The model wins over lexical cues.
        assert_eq!(classifier.classify("Thanks, all great and resolved!").await, Sentiment::Negative);
        assert_eq!(model.longest_input.load(Ordering::SeqCst), HEALTH_CHECK_LEN.max(16));
    }

    const HEALTH_CHECK_LEN: usize = crate::service::sentiment::HEALTH_CHECK_TEXT.len();

    #[tokio::test]
    async fn test_failed_health_check_selects_lexical() {
        let classifier = SentimentClassifier::new(Some(SentimentClient::new(Arc::new(Unreachable))), 512, Duration::from_secs(1)).await;

        assert!(!classifier.uses_model());
        assert_eq!(classifier.classify("This is not working, I am angry").await, Sentiment::Negative);
    }

    #[tokio::test]
    async fn test_failed_call_answers_lexically() {
        let model = FixedSentiment::new("NEGATIVE", true);
        let classifier = SentimentClassifier::new(Some(SentimentClient::new(model.clone())), 512, Duration::from_secs(1)).await;

        assert!(classifier.uses_model());
        assert_eq!(classifier.classify("Thank you, great service").await, Sentiment::Positive);
        // Health check plus one call; no retry.
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }
}
