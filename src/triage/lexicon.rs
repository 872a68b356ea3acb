//! Fixed keyword vocabularies used by extraction, sentiment and scoring.
//!
//! All entries are lower-case and matched as substrings of lower-cased text.

/// Cues counted into `ExtractedSignals::urgency_score`.
pub const URGENCY_CUES: &[&str] = &["urgent", "immediately", "asap", "critical", "emergency", "cannot access", "locked out", "broken", "not working"];

/// Cues counted into `ExtractedSignals::frustration_score`, and the frustration rule of the scorer.
pub const FRUSTRATION_CUES: &[&str] = &["frustrated", "angry", "upset", "disappointed", "terrible", "awful", "worst", "hate", "ridiculous", "unacceptable"];

/// Words marking a sentence as a request or a question.
pub const REQUIREMENT_CUES: &[&str] = &["how", "what", "when", "where", "why", "can you", "could you", "please", "need", "want", "help"];

/// Keywords worth the full critical bonus.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "urgent",
    "immediately",
    "asap",
    "critical",
    "emergency",
    "cannot access",
    "can't access",
    "unable to access",
    "down",
    "outage",
    "payment failed",
    "locked",
    "blocked",
    "broken",
    "not working",
];

/// Keywords of an ordinary support request.
pub const MODERATE_KEYWORDS: &[&str] = &["help", "support", "issue", "problem", "error", "refund"];

pub const LOGIN_TOPIC: &[&str] = &["login", "password"];
pub const BILLING_TOPIC: &[&str] = &["payment", "billing", "refund"];
pub const ACCOUNT_TOPIC: &[&str] = &["account"];
pub const LOCKOUT_TOPIC: &[&str] = &["locked", "blocked"];

/// Stems counted as negative by the lexical sentiment fallback.
pub const NEGATIVE_SENTIMENT_CUES: &[&str] = &["not", "can't", "cannot", "frustrat", "angry", "disappoint", "error", "issue", "problem", "fail"];

/// Stems counted as positive by the lexical sentiment fallback.
pub const POSITIVE_SENTIMENT_CUES: &[&str] = &["thanks", "thank you", "great", "happy", "good", "fixed", "resolved"];

/// Whether lower-cased `text` contains any of `keywords`.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Number of `keywords` that appear in lower-cased `text` (each counted once).
pub fn count_present(text: &str, keywords: &[&str]) -> u32 {
    keywords.iter().filter(|k| text.contains(*k)).count() as u32
}

/// Total non-overlapping occurrences of `keywords` in lower-cased `text`.
pub fn count_occurrences(text: &str, keywords: &[&str]) -> u32 {
    keywords.iter().map(|k| text.matches(k).count() as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_modes() {
        let text = "not now, not ever. i cannot";

        assert_eq!(count_present(text, &["not", "ever"]), 2);
        // "cannot" contains "not".
        assert_eq!(count_occurrences(text, &["not"]), 3);
        assert!(contains_any(text, &["ever"]));
        assert!(!contains_any(text, &["never"]));
    }
}
