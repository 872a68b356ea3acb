//! Triage report rendering.

use std::fmt::Write;

use serde::Serialize;

use crate::{
    base::types::{RawMessage, Res, TriageOutcome},
    service::db::TicketRecord,
};

#[derive(Serialize)]
struct ReportEntry<'a> {
    sender: &'a str,
    subject: &'a str,
    #[serde(flatten)]
    outcome: &'a TriageOutcome,
}

/// Order results for review: highest priority first, inbox order among equals.
pub fn by_priority(results: &mut [(RawMessage, TriageOutcome)]) {
    results.sort_by(|a, b| b.1.assessment.score.total_cmp(&a.1.assessment.score));
}

/// Render results as a JSON array.
pub fn render_json(results: &[(RawMessage, TriageOutcome)]) -> Res<String> {
    let entries = results
        .iter()
        .map(|(message, outcome)| ReportEntry {
            sender: &message.sender,
            subject: &message.subject,
            outcome,
        })
        .collect::<Vec<_>>();

    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Render results as a plain-text report.
pub fn render_text(results: &[(RawMessage, TriageOutcome)]) -> String {
    let mut out = String::new();

    if results.is_empty() {
        out.push_str("No messages to triage.\n");
        return out;
    }

    for (message, outcome) in results {
        let _ = writeln!(out, "[{}] {:.2}  #{}  {}", outcome.assessment.label, outcome.assessment.score, outcome.draft.ticket_reference, message.subject);
        let _ = writeln!(out, "  from:      {}", message.sender);
        let _ = writeln!(out, "  sentiment: {}", outcome.sentiment);
        let _ = writeln!(out, "  summary:   {}", outcome.summary);

        if !outcome.signals.requirement_sentences.is_empty() {
            let _ = writeln!(out, "  needs:     {}", outcome.signals.requirement_sentences.join(" | "));
        }
        if !outcome.knowledge_headers.is_empty() {
            let _ = writeln!(out, "  knowledge: {}", outcome.knowledge_headers.join(", "));
        }

        let _ = writeln!(out, "  draft ({:?}):", outcome.draft.source);
        for line in outcome.draft.body.lines() {
            let _ = writeln!(out, "    {line}");
        }
        out.push('\n');
    }

    out
}

/// Render stored tickets as a JSON array.
pub fn render_tickets_json(tickets: &[TicketRecord]) -> Res<String> {
    Ok(serde_json::to_string_pretty(tickets)?)
}

/// Render stored tickets as one line each.
pub fn render_tickets_text(tickets: &[TicketRecord]) -> String {
    let mut out = String::new();

    if tickets.is_empty() {
        out.push_str("No stored tickets.\n");
        return out;
    }

    for ticket in tickets {
        let _ = writeln!(out, "[{}] {:.2}  {:?}  {}  {}  ({})", ticket.priority_label, ticket.priority_score, ticket.status, ticket.message_id, ticket.subject, ticket.sender);
    }

    out
}
