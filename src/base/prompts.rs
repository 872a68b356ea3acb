//! System directives for the drafting agent.

use crate::base::types::{DraftingContext, truncate_chars};

/// Characters of the customer's subject quoted in a drafting prompt.
pub const PROMPT_SUBJECT_MAX_CHARS: usize = 300;
/// Characters of the customer's body quoted in a drafting prompt.
pub const PROMPT_BODY_MAX_CHARS: usize = 4_000;
/// Characters of knowledge base context quoted in a drafting prompt.
pub const PROMPT_KNOWLEDGE_MAX_CHARS: usize = 4_000;
/// Characters of each analysis note quoted in a drafting prompt.
pub const PROMPT_NOTE_MAX_CHARS: usize = 500;
/// Characters of the ticket reference quoted in a drafting prompt.
pub const PROMPT_TICKET_MAX_CHARS: usize = 32;

/// Default system directive for the drafting agent.
pub const DRAFTING_AGENT_SYSTEM_DIRECTIVE: &str = r#####"
# Prime Directive

You are an expert customer support agent.  You are drafting a reply to an inbound support email on behalf of a human support team.  The reply will be reviewed, and sometimes sent automatically, so it must be ready to send as-is.

Write a professional, empathetic, and solution-focused response of at most 200 words.

## Requirements

  (1) address the customer's specific concerns,
  (2) use the knowledge base context you are given where it is relevant, and never invent policies that are not in it,
  (3) maintain a professional yet warm tone,
  (4) provide clear next steps,
  (5) if the customer is frustrated, acknowledge it and apologize,
  (6) include the support ticket reference exactly as given,
  (7) offer additional assistance channels if the request is urgent.

## Results

Return _just_ the body of the reply as plain text.  Do not wrap it in code blocks, do not add a subject line, and do not add any commentary about the reply.
"#####;

/// Render the user-facing drafting prompt for one message.
///
/// Every free-text field is capped, so the prompt size is bounded whatever the message.
pub fn render_drafting_prompt(context: &DraftingContext) -> String {
    let mut analysis = format!("Sentiment: {}\nPriority: {}\n", context.sentiment, context.priority);

    for note in [&context.frustration_note, &context.urgency_note, &context.contact_note].into_iter().flatten() {
        analysis.push_str(truncate_chars(note, PROMPT_NOTE_MAX_CHARS));
        analysis.push('\n');
    }

    format!(
        "## Customer Email\n\nSubject: {}\nBody: {}\n\n## Analysis\n\n{}\n## Knowledge Base Context\n\n{}\n\n## Support Ticket\n\n#{}\n",
        truncate_chars(&context.subject, PROMPT_SUBJECT_MAX_CHARS),
        truncate_chars(&context.body, PROMPT_BODY_MAX_CHARS),
        analysis,
        truncate_chars(&context.knowledge_context, PROMPT_KNOWLEDGE_MAX_CHARS),
        truncate_chars(&context.ticket_reference, PROMPT_TICKET_MAX_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::{PriorityLabel, Sentiment};

    #[test]
    fn test_render_drafting_prompt_includes_notes() {
        let context = DraftingContext {
            subject: "Locked out".to_string(),
            body: "Please help.".to_string(),
            sentiment: Sentiment::Negative,
            priority: PriorityLabel::Urgent,
            frustration_note: Some("IMPORTANT: Customer appears frustrated.".to_string()),
            urgency_note: None,
            contact_note: None,
            knowledge_context: "ACCOUNT: Reset links expire after 1 hour.".to_string(),
            ticket_reference: "abcd1234".to_string(),
        };

        let prompt = render_drafting_prompt(&context);

        assert!(prompt.contains("Subject: Locked out"));
        assert!(prompt.contains("Priority: Urgent"));
        assert!(prompt.contains("Customer appears frustrated"));
        assert!(prompt.contains("Reset links expire"));
        assert!(prompt.contains("#abcd1234"));
    }

    #[test]
    fn test_render_drafting_prompt_is_bounded() {
        let huge = "x".repeat(1_000_000);
        let context = DraftingContext {
            subject: huge.clone(),
            body: huge.clone(),
            sentiment: Sentiment::Neutral,
            priority: PriorityLabel::Low,
            frustration_note: Some(huge.clone()),
            urgency_note: Some(huge.clone()),
            contact_note: Some(huge.clone()),
            knowledge_context: huge.clone(),
            ticket_reference: huge,
        };

        let prompt = render_drafting_prompt(&context);

        assert!(prompt.len() < 20_000, "prompt is {} bytes", prompt.len());
        assert!(prompt.contains(&"x".repeat(PROMPT_BODY_MAX_CHARS)));
    }
}
