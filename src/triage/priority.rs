//! Deterministic priority scoring.
//!
//! Rules are evaluated in a fixed order and only ever add points, so adding a
//! matching condition to a message can never lower its score.

use tracing::{debug, instrument};

use crate::base::types::{ExtractedSignals, PriorityAssessment, Sentiment};

use super::lexicon::{ACCOUNT_TOPIC, BILLING_TOPIC, CRITICAL_KEYWORDS, FRUSTRATION_CUES, LOCKOUT_TOPIC, LOGIN_TOPIC, MODERATE_KEYWORDS, contains_any};

pub const CRITICAL_WEIGHT: f64 = 3.0;
pub const MODERATE_WEIGHT: f64 = 1.0;
pub const FRUSTRATION_WEIGHT: f64 = 1.5;
pub const LOGIN_WEIGHT: f64 = 1.0;
pub const BILLING_WEIGHT: f64 = 1.5;
pub const ACCOUNT_LOCKOUT_WEIGHT: f64 = 2.0;
pub const NEGATIVE_SENTIMENT_WEIGHT: f64 = 1.0;
pub const URGENCY_SIGNAL_WEIGHT: f64 = 0.5;
pub const FRUSTRATION_SIGNAL_WEIGHT: f64 = 0.3;
pub const PAID_CUSTOMER_WEIGHT: f64 = 1.0;

/// Score a message and derive its label.
#[instrument(skip_all)]
pub fn score(text: &str, sentiment: Sentiment, signals: &ExtractedSignals, is_paid_customer: bool) -> PriorityAssessment {
    let t = text.to_lowercase();
    let mut score = 0.0;

    // Critical and moderate keywords are mutually exclusive.
    if contains_any(&t, CRITICAL_KEYWORDS) {
        score += CRITICAL_WEIGHT;
    } else if contains_any(&t, MODERATE_KEYWORDS) {
        score += MODERATE_WEIGHT;
    }

    if contains_any(&t, FRUSTRATION_CUES) {
        score += FRUSTRATION_WEIGHT;
    }

    // Topics.
    if contains_any(&t, LOGIN_TOPIC) {
        score += LOGIN_WEIGHT;
    }
    if contains_any(&t, BILLING_TOPIC) {
        score += BILLING_WEIGHT;
    }
    if contains_any(&t, ACCOUNT_TOPIC) && contains_any(&t, LOCKOUT_TOPIC) {
        score += ACCOUNT_LOCKOUT_WEIGHT;
    }

    if sentiment == Sentiment::Negative {
        score += NEGATIVE_SENTIMENT_WEIGHT;
    }

    score += URGENCY_SIGNAL_WEIGHT * signals.urgency_score as f64;
    score += FRUSTRATION_SIGNAL_WEIGHT * signals.frustration_score as f64;

    if is_paid_customer {
        score += PAID_CUSTOMER_WEIGHT;
    }

    let assessment = PriorityAssessment::from_score(score);
    debug!("Priority score {} ({}).", assessment.score, assessment.label);

    assessment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base::types::PriorityLabel, triage::extract::extract};

    fn score_text(text: &str, sentiment: Sentiment) -> PriorityAssessment {
        score(text, sentiment, &extract(text), false)
    }

    #[test]
    fn test_critical_keyword_alone_is_medium() {
        for text in ["The dashboard is down", "We see an outage in EU", "My card was blocked"] {
            let assessment = score_text(text, Sentiment::Neutral);

            assert_eq!(assessment.score, 3.0, "{text}");
            assert_eq!(assessment.label, PriorityLabel::Medium, "{text}");
        }
    }

    #[test]
    fn test_moderate_keyword_alone_is_low() {
        let assessment = score_text("I have a question about an error", Sentiment::Neutral);

        assert_eq!(assessment.score, 1.0);
        assert_eq!(assessment.label, PriorityLabel::Low);
    }

    #[test]
    fn test_critical_takes_precedence_over_moderate() {
        assert_eq!(score_text("outage, need support", Sentiment::Neutral).score, 3.0);
    }

    #[test]
    fn test_account_lockout_with_negative_sentiment_is_urgent() {
        let text = "My account is locked";
        let assessment = score(text, Sentiment::Negative, &ExtractedSignals::default(), false);

        // locked (critical) + account/locked + negative.
        assert_eq!(assessment.score, 6.0);
        assert_eq!(assessment.label, PriorityLabel::Urgent);
    }

    #[test]
    fn test_signal_and_paid_bonuses() {
        let signals = ExtractedSignals {
            urgency_score: 2,
            frustration_score: 1,
            ..Default::default()
        };

        let free = score("hello", Sentiment::Neutral, &signals, false);
        let paid = score("hello", Sentiment::Neutral, &signals, true);

        assert_eq!(free.score, 1.3);
        assert_eq!(paid.score, 2.3);
    }

    #[test]
    fn test_topic_bonuses_stack() {
        // help (moderate) + password + refund (billing).
        let assessment = score("help with password and refund", Sentiment::Neutral, &ExtractedSignals::default(), false);

        assert_eq!(assessment.score, 3.5);
        assert_eq!(assessment.label, PriorityLabel::Medium);
    }

    #[test]
    fn test_score_is_monotonic_in_added_conditions() {
        let steps = [
            "hello",
            "hello, I need help",
            "hello, I need help, the site is down",
            "hello, I need help, the site is down and I am frustrated",
            "hello, I need help, the site is down and I am frustrated, my password fails",
            "hello, I need help, the site is down and I am frustrated, my password fails, billing too",
            "hello, I need help, the site is down and I am frustrated, my password fails, billing too, account blocked",
            "hello, I need help, the site is down and I am frustrated, my password fails, billing too, account blocked, urgent",
        ];

        let mut previous = 0.0;
        for (idx, text) in steps.iter().enumerate() {
            let current = score_text(text, Sentiment::Neutral).score;
            assert!(current >= previous, "step {idx} lowered the score: {previous} -> {current}");
            previous = current;

            let negative = score_text(text, Sentiment::Negative).score;
            assert!(negative >= current);

            let paid = score(text, Sentiment::Neutral, &extract(text), true).score;
            assert!(paid >= current);
        }
    }

    #[test]
    fn test_label_recomputable_from_score() {
        let assessment = score_text("URGENT outage, payment failed, I am angry and upset", Sentiment::Negative);

        assert_eq!(assessment.label, PriorityLabel::from_score(assessment.score));
    }
}
