//! Pattern-based signal extraction.
//!
//! Everything here is a pure function of the message text.  Patterns are matched
//! as-is; no attempt is made to validate that a phone number or order id is real.

use std::sync::OnceLock;

use regex::Regex;
use tracing::instrument;

use crate::base::types::ExtractedSignals;

use super::lexicon::{FRUSTRATION_CUES, REQUIREMENT_CUES, URGENCY_CUES, count_present};

/// Requirement sentences kept per message.
pub const MAX_REQUIREMENT_SENTENCES: usize = 3;

/// Digits a phone candidate needs after normalization.
pub const MIN_PHONE_DIGITS: usize = 8;

/// Extract every signal from `text`.
#[instrument(skip_all)]
pub fn extract(text: &str) -> ExtractedSignals {
    if text.trim().is_empty() {
        return ExtractedSignals::default();
    }

    let lowered = text.to_lowercase();

    ExtractedSignals {
        phones: extract_phones(text),
        emails: extract_emails(text),
        order_ids: extract_order_ids(text),
        requirement_sentences: extract_requirement_sentences(text),
        urgency_score: count_present(&lowered, URGENCY_CUES),
        frustration_score: count_present(&lowered, FRUSTRATION_CUES),
    }
}

/// Phone numbers, normalized to digits (and a leading `+`).
pub fn extract_phones(text: &str) -> Vec<String> {
    let phones = phone_regex()
        .find_iter(text)
        .map(|m| m.as_str().chars().filter(|c| c.is_ascii_digit() || *c == '+').collect::<String>())
        .filter(|phone| phone.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS);

    dedup(phones)
}

pub fn extract_emails(text: &str) -> Vec<String> {
    dedup(email_regex().find_iter(text).map(|m| m.as_str().to_string()))
}

pub fn extract_order_ids(text: &str) -> Vec<String> {
    dedup(order_regex().captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str().to_string()))
}

/// The first sentences that read as a request or a question, in source order.
pub fn extract_requirement_sentences(text: &str) -> Vec<String> {
    sentence_split_regex()
        .split(text)
        .map(|sentence| sentence.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|sentence| !sentence.is_empty() && requirement_cue_regex().is_match(sentence))
        .take(MAX_REQUIREMENT_SENTENCES)
        .collect()
}

// Helpers.

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for item in items {
        if !result.contains(&item) {
            result.push(item);
        }
    }
    result
}

// Statics.

static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static ORDER_RE: OnceLock<Regex> = OnceLock::new();
static SENTENCE_SPLIT_RE: OnceLock<Regex> = OnceLock::new();
static REQUIREMENT_CUE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"\+?\d[\d\-\s]{6,}\d").expect("phone regex must compile"))
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"[\w.+\-]+@[\w\-]+(?:\.[\w\-]+)*\.[A-Za-z]{2,}").expect("email regex must compile"))
}

fn order_regex() -> &'static Regex {
    ORDER_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:\b(?:order|ord)\b\.?(?:\s*(?:id|number|no)\b)?(?:\s*(?:is\b|:))?\s*#?|#)\s*([A-Z0-9\-]{3,20})").expect("order regex must compile")
    })
}

fn sentence_split_regex() -> &'static Regex {
    SENTENCE_SPLIT_RE.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence regex must compile"))
}

fn requirement_cue_regex() -> &'static Regex {
    REQUIREMENT_CUE_RE.get_or_init(|| {
        let cues = REQUIREMENT_CUES.iter().map(|cue| regex::escape(cue)).collect::<Vec<_>>().join("|");
        Regex::new(&format!(r"(?i)\b(?:{cues})\b")).expect("requirement cue regex must compile")
    })
}
