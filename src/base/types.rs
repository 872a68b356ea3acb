use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Messages.

/// An inbound support message, as handed over by the message source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, alias = "date")]
    pub timestamp: String,
}

impl RawMessage {
    /// The text that signals, sentiment and priority are computed over.
    pub fn triage_text(&self) -> String {
        format!("{}\n{}", self.subject, self.body)
    }

    /// The text used as a knowledge retrieval query.
    pub fn retrieval_query(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }
}

// Signals.

/// Structured facts mechanically extracted from a message's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSignals {
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub order_ids: Vec<String>,
    pub requirement_sentences: Vec<String>,
    pub urgency_score: u32,
    pub frustration_score: u32,
}

impl ExtractedSignals {
    pub fn is_frustrated(&self) -> bool {
        self.frustration_score > 0
    }

    pub fn has_contact_details(&self) -> bool {
        !self.phones.is_empty() || !self.emails.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

/// Raw output of an external sentiment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPrediction {
    pub label: String,
    #[serde(default)]
    pub score: f32,
}

// Priority.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityLabel {
    Low,
    Medium,
    Urgent,
}

impl PriorityLabel {
    /// Lower bound (inclusive) of the `Medium` band.
    pub const MEDIUM_THRESHOLD: f64 = 2.5;
    /// Lower bound (inclusive) of the `Urgent` band.
    pub const URGENT_THRESHOLD: f64 = 4.0;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::URGENT_THRESHOLD {
            PriorityLabel::Urgent
        } else if score >= Self::MEDIUM_THRESHOLD {
            PriorityLabel::Medium
        } else {
            PriorityLabel::Low
        }
    }
}

impl std::fmt::Display for PriorityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityLabel::Low => write!(f, "Low"),
            PriorityLabel::Medium => write!(f, "Medium"),
            PriorityLabel::Urgent => write!(f, "Urgent"),
        }
    }
}

/// A priority score (rounded to 2 decimals) and the label derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityAssessment {
    pub score: f64,
    pub label: PriorityLabel,
}

impl PriorityAssessment {
    pub fn from_score(score: f64) -> Self {
        let score = (score * 100.0).round() / 100.0;

        Self { score, label: PriorityLabel::from_score(score) }
    }
}

// Knowledge.

/// The smallest retrievable unit of the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub header: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl KnowledgeChunk {
    /// The text submitted to the embedding model.
    pub fn embeddable_text(&self) -> String {
        embeddable_text(&self.header, &self.text)
    }
}

pub fn embeddable_text(header: &str, text: &str) -> String {
    format!("{header}: {text}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: KnowledgeChunk,
    pub similarity: f32,
}

/// Ranked chunks, by descending similarity.
pub type RetrievalResult = Vec<RetrievedChunk>;

// Drafting.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftSource {
    Generated,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDraft {
    pub body: String,
    pub ticket_reference: String,
    pub source: DraftSource,
}

/// Everything the drafting agent is given to phrase a reply.
#[derive(Debug, Clone)]
pub struct DraftingContext {
    pub subject: String,
    pub body: String,
    pub sentiment: Sentiment,
    pub priority: PriorityLabel,
    pub frustration_note: Option<String>,
    pub urgency_note: Option<String>,
    pub contact_note: Option<String>,
    pub knowledge_context: String,
    pub ticket_reference: String,
}

// Outcomes.

/// The full result of triaging one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub message_id: String,
    pub sentiment: Sentiment,
    pub signals: ExtractedSignals,
    pub assessment: PriorityAssessment,
    pub summary: String,
    pub knowledge_headers: Vec<String>,
    pub draft: ResponseDraft,
}

// Helpers.

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(PriorityLabel::from_score(0.0), PriorityLabel::Low);
        assert_eq!(PriorityLabel::from_score(2.49), PriorityLabel::Low);
        assert_eq!(PriorityLabel::from_score(2.5), PriorityLabel::Medium);
        assert_eq!(PriorityLabel::from_score(3.99), PriorityLabel::Medium);
        assert_eq!(PriorityLabel::from_score(4.0), PriorityLabel::Urgent);
    }

    #[test]
    fn test_assessment_rounds_before_labelling() {
        let assessment = PriorityAssessment::from_score(3.996);

        assert_eq!(assessment.score, 4.0);
        assert_eq!(assessment.label, PriorityLabel::Urgent);
    }

    #[test]
    fn test_raw_message_accepts_date_alias() {
        let message: RawMessage = serde_json::from_str(r#"{"id": "abc", "subject": "Help", "date": "2025-01-06"}"#).unwrap();

        assert_eq!(message.timestamp, "2025-01-06");
        assert_eq!(message.body, "");
    }
}
