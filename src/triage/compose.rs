//! Reply drafting.
//!
//! Every draft carries the ticket reference.  When a drafting agent is configured
//! it phrases the reply in a single bounded attempt; otherwise, or when that
//! attempt yields nothing usable, the reply comes from a template keyed by the
//! priority label and the customer's mood.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{DraftSource, DraftingContext, ExtractedSignals, PriorityAssessment, PriorityLabel, RawMessage, ResponseDraft, RetrievedChunk, Sentiment},
    service::llm::LlmClient,
};

use super::summary::{sentences, summarize};

/// Characters of knowledge base text quoted in a template reply.
pub const GROUNDING_MAX_CHARS: usize = 200;

/// Knowledge context given to the drafting agent when nothing was retrieved.
pub const NO_KNOWLEDGE_CONTEXT: &str = "General support available";

const TICKET_REFERENCE_LEN: usize = 8;
const EMPTY_TICKET_REFERENCE: &str = "TEMP";

/// The reference quoted back to the customer: the first characters of the message id.
pub fn ticket_reference(message_id: &str) -> String {
    if message_id.is_empty() {
        return EMPTY_TICKET_REFERENCE.to_string();
    }

    message_id.chars().take(TICKET_REFERENCE_LEN).collect()
}

/// Promised first-response window for a label.
pub fn response_window(label: PriorityLabel) -> &'static str {
    match label {
        PriorityLabel::Urgent => "within 1 hour",
        PriorityLabel::Medium => "within 2-4 hours",
        PriorityLabel::Low => "within 1-2 business days",
    }
}

/// Reply composer, cheap to clone.
#[derive(Clone)]
pub struct Composer {
    llm: Option<LlmClient>,
    timeout: Duration,
}

impl Composer {
    pub fn new(llm: Option<LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// A composer that only ever uses the template.
    pub fn template_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    #[instrument(name = "Composer::compose", skip_all, fields(message_id = %message.id))]
    pub async fn compose(&self, message: &RawMessage, assessment: &PriorityAssessment, sentiment: Sentiment, signals: &ExtractedSignals, retrieval: &[RetrievedChunk]) -> ResponseDraft {
        let ticket_reference = ticket_reference(&message.id);

        if let Some(llm) = &self.llm {
            let context = drafting_context(message, assessment, sentiment, signals, retrieval, &ticket_reference);

            match timeout(self.timeout, llm.get_drafting_agent_response(&context)).await {
                Ok(Ok(body)) if !body.trim().is_empty() => {
                    info!("Reply drafted by the drafting agent.");
                    return ResponseDraft {
                        body: ensure_ticket_reference(body.trim(), &ticket_reference),
                        ticket_reference,
                        source: DraftSource::Generated,
                    };
                }
                Ok(Ok(_)) => warn!("Drafting agent returned an empty reply; using the template."),
                Ok(Err(err)) => warn!("Drafting agent failed, using the template: {err}"),
                Err(_) => warn!("Drafting agent timed out after {:?}; using the template.", self.timeout),
            }
        }

        ResponseDraft {
            body: template_reply(message, assessment.label, sentiment, signals, retrieval, &ticket_reference),
            ticket_reference,
            source: DraftSource::Template,
        }
    }
}

/// Assemble what the drafting agent is told about a message.
pub fn drafting_context(
    message: &RawMessage,
    assessment: &PriorityAssessment,
    sentiment: Sentiment,
    signals: &ExtractedSignals,
    retrieval: &[RetrievedChunk],
    ticket_reference: &str,
) -> DraftingContext {
    let frustration_note = signals
        .is_frustrated()
        .then(|| "IMPORTANT: Customer appears frustrated. Acknowledge their frustration empathetically and prioritize resolution.".to_string());

    let urgency_note = (assessment.label == PriorityLabel::Urgent).then(|| "URGENT REQUEST: Respond with immediate action steps and escalation if needed.".to_string());

    let contact_note = signals
        .has_contact_details()
        .then(|| format!("Customer contact details on file: phones [{}], emails [{}].", signals.phones.join(", "), signals.emails.join(", ")));

    let knowledge_context = if retrieval.is_empty() {
        NO_KNOWLEDGE_CONTEXT.to_string()
    } else {
        retrieval.iter().map(|r| r.chunk.embeddable_text()).collect::<Vec<_>>().join("\n")
    };

    DraftingContext {
        subject: message.subject.clone(),
        body: message.body.clone(),
        sentiment,
        priority: assessment.label,
        frustration_note,
        urgency_note,
        contact_note,
        knowledge_context,
        ticket_reference: ticket_reference.to_string(),
    }
}

/// The deterministic reply.
pub fn template_reply(message: &RawMessage, label: PriorityLabel, sentiment: Sentiment, signals: &ExtractedSignals, retrieval: &[RetrievedChunk], ticket_reference: &str) -> String {
    let apologetic = sentiment == Sentiment::Negative || signals.is_frustrated();
    let window = response_window(label);

    let mut body = String::new();

    if apologetic {
        body.push_str("We sincerely apologize for the inconvenience and understand your frustration.\n\n");
        body.push_str("Your experience is not meeting our standards, and we want to make this right.\n\n");
    } else {
        body.push_str("Thank you for reaching out to us.\n\n");
        body.push_str("We're here to help and make sure you have the best experience possible.\n\n");
    }

    body.push_str(&format!("Subject: {}\n\n", message.subject));

    let summary = summarize(&message.triage_text());
    if !summary.is_empty() {
        body.push_str(&format!("Summary of your issue:\n{summary}\n\n"));
    }

    match label {
        PriorityLabel::Urgent => body.push_str("Given the urgent nature of your request, we have escalated it for immediate attention.\n\n"),
        PriorityLabel::Medium => body.push_str("Your request has been assigned to our support team.\n\n"),
        PriorityLabel::Low => body.push_str("Your request is in our queue and will be handled in the order it was received.\n\n"),
    }

    if !signals.requirement_sentences.is_empty() {
        body.push_str("We understand you need the following:\n");
        for sentence in &signals.requirement_sentences {
            body.push_str(&format!("- {sentence}\n"));
        }
        body.push('\n');
    }

    if let Some(grounding) = retrieval.first().map(|r| trim_to_sentences(&r.chunk.text, GROUNDING_MAX_CHARS)).filter(|g| !g.is_empty()) {
        body.push_str(&format!("Based on your inquiry, this may help:\n{grounding}\n\n"));
    }

    body.push_str("Next steps:\n");
    body.push_str(&format!("1) Our team is looking into this and will update you {window}.\n"));
    if label == PriorityLabel::Urgent {
        body.push_str("2) If you need immediate assistance, please call our priority support line.\n");
    } else {
        body.push_str("2) Reply to this email if anything changes in the meantime.\n");
    }
    body.push_str("3) Any additional details (screenshots, error messages, order ID) will help us resolve this faster.\n\n");

    if signals.has_contact_details() {
        body.push_str("We have your contact information on file for updates.\n\n");
    }

    body.push_str(&format!("Best regards,\nCustomer Support Team\nSupport Ticket: #{ticket_reference}\n"));

    body
}

/// Whole leading sentences of `text` that fit in `max_chars`.
///
/// A first sentence that is already too long is cut at a word boundary.
pub fn trim_to_sentences(text: &str, max_chars: usize) -> String {
    let mut result = String::new();

    for sentence in sentences(text.trim()) {
        let extra = if result.is_empty() { 0 } else { 1 };
        if result.chars().count() + extra + sentence.chars().count() > max_chars {
            break;
        }
        if extra == 1 {
            result.push(' ');
        }
        result.push_str(sentence);
    }

    if result.is_empty() && !text.trim().is_empty() {
        let prefix = text.trim().chars().take(max_chars).collect::<String>();
        result = match prefix.rfind(char::is_whitespace) {
            Some(idx) if prefix.chars().count() == max_chars => prefix[..idx].trim_end().to_string(),
            _ => prefix,
        };
    }

    result
}

fn ensure_ticket_reference(body: &str, ticket_reference: &str) -> String {
    let marker = format!("#{ticket_reference}");

    if body.contains(&marker) {
        body.to_string()
    } else {
        format!("{body}\n\nSupport Ticket: {marker}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        base::types::{KnowledgeChunk, Res},
        service::llm::GenericLlmClient,
    };

    struct Drafts(&'static str);

    #[async_trait]
    impl GenericLlmClient for Drafts {
        async fn get_drafting_agent_response(&self, _context: &DraftingContext) -> Res<String> {
            Ok(self.0.to_string())
        }
    }

    struct Fails;

    #[async_trait]
    impl GenericLlmClient for Fails {
        async fn get_drafting_agent_response(&self, _context: &DraftingContext) -> Res<String> {
            Err(anyhow::anyhow!("rate limited"))
        }
    }

    struct Hangs;

    #[async_trait]
    impl GenericLlmClient for Hangs {
        async fn get_drafting_agent_response(&self, _context: &DraftingContext) -> Res<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn message() -> RawMessage {
        RawMessage {
            id: "abcdef123456".to_string(),
            sender: "Jo <jo@example.com>".to_string(),
            subject: "Cannot log in".to_string(),
            body: "I cannot log in. How do I reset my password?".to_string(),
            timestamp: String::new(),
        }
    }

    fn retrieved(text: &str) -> Vec<RetrievedChunk> {
        vec![RetrievedChunk {
            chunk: KnowledgeChunk {
                header: "ACCOUNT".to_string(),
                text: text.to_string(),
                embedding: vec![],
            },
            similarity: 0.8,
        }]
    }

    fn medium() -> PriorityAssessment {
        PriorityAssessment::from_score(3.0)
    }

    #[test]
    fn test_ticket_reference() {
        assert_eq!(ticket_reference("abcdef123456"), "abcdef12");
        assert_eq!(ticket_reference("abc"), "abc");
        assert_eq!(ticket_reference(""), "TEMP");
    }

    #[test]
    fn test_trim_to_sentences() {
        let text = "First sentence here. Second one is a little longer. Third.";

        assert_eq!(trim_to_sentences(text, 25), "First sentence here.");
        assert_eq!(trim_to_sentences(text, 200), text);
        assert_eq!(trim_to_sentences("a very long single sentence", 12), "a very long");
    }

    #[test]
    fn test_template_tone_and_window_by_label() {
        let signals = ExtractedSignals::default();

        let urgent = template_reply(&message(), PriorityLabel::Urgent, Sentiment::Neutral, &signals, &[], "abcdef12");
        let low = template_reply(&message(), PriorityLabel::Low, Sentiment::Positive, &signals, &[], "abcdef12");

        assert!(urgent.contains("within 1 hour"));
        assert!(urgent.contains("priority support line"));
        assert!(low.contains("within 1-2 business days"));
        assert!(low.starts_with("Thank you for reaching out"));
        assert!(low.ends_with("Support Ticket: #abcdef12\n"));
    }

    #[test]
    fn test_template_apologizes_when_frustrated_even_if_neutral() {
        let signals = ExtractedSignals { frustration_score: 1, ..Default::default() };

        let body = template_reply(&message(), PriorityLabel::Medium, Sentiment::Neutral, &signals, &[], "abcdef12");

        assert!(body.starts_with("We sincerely apologize"));
        assert!(body.contains("within 2-4 hours"));
    }

    #[test]
    fn test_template_includes_requirements_grounding_and_contact() {
        let signals = ExtractedSignals {
            emails: vec!["jo@example.com".to_string()],
            requirement_sentences: vec!["How do I reset my password".to_string()],
            ..Default::default()
        };
        let retrieval = retrieved("Reset a forgotten password from the login page. Links expire after one hour.");

        let body = template_reply(&message(), PriorityLabel::Low, Sentiment::Neutral, &signals, &retrieval, "abcdef12");

        assert!(body.contains("- How do I reset my password\n"));
        assert!(body.contains("Reset a forgotten password from the login page. Links expire after one hour."));
        assert!(body.contains("contact information on file"));
    }

    #[test]
    fn test_template_quotes_the_summary() {
        let body = template_reply(&message(), PriorityLabel::Low, Sentiment::Neutral, &ExtractedSignals::default(), &[], "abcdef12");

        assert!(body.contains(&format!("Summary of your issue:\n{}\n", summarize(&message().triage_text()))));
        assert!(body.contains("How do I reset my password?"));
    }

    #[tokio::test]
    async fn test_generated_reply_gets_ticket_reference() {
        let composer = Composer::new(Some(LlmClient::new(Arc::new(Drafts("Hi, we reset it for you.")))), Duration::from_secs(1));

        let draft = composer.compose(&message(), &medium(), Sentiment::Neutral, &ExtractedSignals::default(), &[]).await;

        assert_eq!(draft.source, DraftSource::Generated);
        assert_eq!(draft.body, "Hi, we reset it for you.\n\nSupport Ticket: #abcdef12");
    }

    #[tokio::test]
    async fn test_generated_reply_with_reference_is_kept() {
        let composer = Composer::new(Some(LlmClient::new(Arc::new(Drafts("Done. Ticket #abcdef12")))), Duration::from_secs(1));

        let draft = composer.compose(&message(), &medium(), Sentiment::Neutral, &ExtractedSignals::default(), &[]).await;

        assert_eq!(draft.body, "Done. Ticket #abcdef12");
    }

    #[tokio::test]
    async fn test_failed_or_empty_generation_falls_back() {
        for llm in [LlmClient::new(Arc::new(Fails)), LlmClient::new(Arc::new(Drafts("   ")))] {
            let composer = Composer::new(Some(llm), Duration::from_secs(1));

            let draft = composer.compose(&message(), &medium(), Sentiment::Neutral, &ExtractedSignals::default(), &[]).await;

            assert_eq!(draft.source, DraftSource::Template);
            assert!(draft.body.contains("#abcdef12"));
            assert!(draft.body.contains("within 2-4 hours"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_generation_falls_back() {
        let composer = Composer::new(Some(LlmClient::new(Arc::new(Hangs))), Duration::from_secs(5));

        let draft = composer.compose(&message(), &medium(), Sentiment::Neutral, &ExtractedSignals::default(), &[]).await;

        assert_eq!(draft.source, DraftSource::Template);
    }

    #[test]
    fn test_drafting_context_notes() {
        let signals = ExtractedSignals {
            phones: vec!["5551234567".to_string()],
            frustration_score: 2,
            ..Default::default()
        };

        let context = drafting_context(&message(), &PriorityAssessment::from_score(5.0), Sentiment::Negative, &signals, &[], "abcdef12");

        assert!(context.frustration_note.is_some());
        assert!(context.urgency_note.is_some());
        assert!(context.contact_note.as_deref().is_some_and(|n| n.contains("5551234567")));
        assert_eq!(context.knowledge_context, NO_KNOWLEDGE_CONTEXT);
    }
}
