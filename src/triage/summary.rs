//! Short message summaries for the ticket list.

use super::lexicon::{CRITICAL_KEYWORDS, contains_any};

/// Sentences kept in a summary.
pub const SUMMARY_SENTENCES: usize = 3;

/// Characters kept in a summary, before the urgency prefix.
pub const SUMMARY_MAX_CHARS: usize = 200;

pub const URGENT_PREFIX: &str = "[URGENT] ";

/// The first sentences of `text`, capped in length and flagged when a critical keyword is present.
pub fn summarize(text: &str) -> String {
    let summary = sentences(text.trim()).into_iter().take(SUMMARY_SENTENCES).collect::<Vec<_>>().join(" ");
    let summary = summary.chars().take(SUMMARY_MAX_CHARS).collect::<String>();

    if contains_any(&text.to_lowercase(), CRITICAL_KEYWORDS) {
        format!("{URGENT_PREFIX}{summary}")
    } else {
        summary
    }
}

/// Split after sentence punctuation that is followed by whitespace.  Punctuation is kept.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        if let Some(&(next, n)) = chars.peek()
            && n.is_whitespace()
        {
            result.push(text[start..idx + c.len_utf8()].trim());
            start = next;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        result.push(tail);
    }

    result.retain(|s| !s.is_empty());
    result
}
