//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // dialogue-events = { path = "../dialogue-events", features = ["test-fixtures"] }
//!
//! use dialogue_events::fixtures;
//!
//! let history = fixtures::sample_history();
//! ```

use crate::HistoryEntry;

/// Returns a five-utterance exchange between Alice and Bob.
///
/// Alice argues for a new approach, Bob defends the current one.
pub fn sample_history() -> Vec<HistoryEntry> {
    let jsonl = include_str!("../tests/fixtures/sample_history.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            HistoryEntry::from_jsonl(l).unwrap_or_else(|e| {
                panic!("Failed to parse history line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// Names of the speakers appearing in [`sample_history`], in first-appearance order.
pub fn sample_speakers() -> Vec<String> {
    let mut speakers: Vec<String> = Vec::new();
    for entry in sample_history() {
        if !speakers.contains(&entry.speaker) {
            speakers.push(entry.speaker);
        }
    }
    speakers
}
