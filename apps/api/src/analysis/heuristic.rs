//! Heuristic client analysis — the deterministic local tier.
//!
//! Pure text scoring: no I/O, no model call, never fails, and never emits
//! `Priority::Unknown`. A no-signal record lands on Medium.

use chrono::Utc;

use crate::analysis::aggregate;
use crate::models::analysis::{AnalysisSource, ClientAnalysis, Priority};
use crate::models::client::ClientRow;

/// Substrings marking a promising or time-sensitive client. Bilingual, like
/// the client base: budget talks, contracts, VIPs, scheduled meetings.
const HIGH_SIGNALS: &[&str] = &[
    "urgent", "asap", "immédiat", "budget", "contrat", "vip", "important", "meeting", "rendez",
];

/// Substrings marking refusal or lost interest.
const NEGATIVE_SIGNALS: &[&str] = &["pas intéress", "refus", "abandon", "no need", "sans suite"];

/// Common English and French words excluded from keyword extraction.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "from", "have", "has", "are", "was", "were",
    "les", "des", "une", "un", "et", "pour", "avec", "dans", "sur", "par", "est", "sont", "être",
    "avoir", "de", "la", "le", "du", "au", "aux", "en", "à", "a", "d",
];

const SUMMARY_MAX_CHARS: usize = 240;
const KEYWORD_LIMIT: usize = 10;
const MIN_TOKEN_CHARS: usize = 4;
const NO_NOTES_SUMMARY: &str = "Aucune note fournie.";

/// Analyzes a client record from its aggregated text alone. Deterministic:
/// the same record always yields the same priority, summary, and keywords.
pub fn analyze(client: &ClientRow) -> ClientAnalysis {
    let text = aggregate::scoring_blob(client);
    let lowered = text.to_lowercase();

    ClientAnalysis {
        priority: classify(signal_score(&lowered)),
        summary: summarize(&text),
        keywords: extract_keywords(&text, KEYWORD_LIMIT),
        generated_at: Utc::now(),
        source: AnalysisSource::Heuristic,
    }
}

/// Each signal counts once, no matter how often it repeats in the text.
fn signal_score(lowered: &str) -> i32 {
    let highs = HIGH_SIGNALS.iter().filter(|s| lowered.contains(**s)).count() as i32;
    let negatives = NEGATIVE_SIGNALS
        .iter()
        .filter(|s| lowered.contains(**s))
        .count() as i32;
    highs * 2 - negatives * 2
}

fn classify(score: i32) -> Priority {
    if score >= 2 {
        Priority::High
    } else if score <= -1 {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// First 240 characters of the blob, with a `...` marker when truncated.
/// Operates on chars, never splitting a multi-byte code point.
fn summarize(text: &str) -> String {
    if text.trim().is_empty() {
        return NO_NOTES_SUMMARY.to_string();
    }
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_string();
    }
    let mut summary: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    summary.push_str("...");
    summary
}

/// Frequency-based keyword extraction:
/// tokenize on whitespace, strip non-alphanumerics, drop short tokens and
/// stop words, group case-insensitively, rank by count (ties alphabetical),
/// and return the first-seen casing of each of the top `limit` groups.
pub(crate) fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    // (lowercased key, first-seen casing, count)
    let mut groups: Vec<(String, String, usize)> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for raw in text.split_whitespace() {
        let token: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        if token.chars().count() < MIN_TOKEN_CHARS {
            continue;
        }
        let lower = token.to_lowercase();
        if STOP_WORDS.contains(&lower.as_str()) {
            continue;
        }
        match index.get(&lower) {
            Some(&at) => groups[at].2 += 1,
            None => {
                index.insert(lower.clone(), groups.len());
                groups.push((lower, token, 1));
            }
        }
    }

    groups.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    groups
        .into_iter()
        .take(limit)
        .map(|(_, token, _)| token)
        .collect()
}
