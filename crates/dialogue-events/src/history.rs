//! Conversation History
//!
//! One entry per utterance, in the order the utterances happened.

use serde::{Deserialize, Serialize};

/// A single logged utterance.
///
/// `step` is the simulation step the utterance was logged under. Injected
/// messages share the step index of the step that follows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: u64,
    pub speaker: String,
    pub message: String,
}

impl HistoryEntry {
    pub fn new(step: u64, speaker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step,
            speaker: speaker.into(),
            message: message.into(),
        }
    }

    /// Renders the entry as a `speaker: message` transcript line.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.speaker, self.message)
    }

    /// Serializes the entry to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an entry from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Joins a history into a newline-separated `speaker: message` transcript.
pub fn format_transcript(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .map(HistoryEntry::transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_preserves_order() {
        let history = vec![
            HistoryEntry::new(0, "Mediator", "Welcome."),
            HistoryEntry::new(0, "Alice", "Hello."),
            HistoryEntry::new(1, "Bob", "Hi Alice."),
        ];

        assert_eq!(
            format_transcript(&history),
            "Mediator: Welcome.\nAlice: Hello.\nBob: Hi Alice."
        );
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(format_transcript(&[]), "");
    }

    #[test]
    fn test_jsonl_line() {
        let entry = HistoryEntry::new(3, "Bob", "Change always brings risks.");
        let line = entry.to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(HistoryEntry::from_jsonl(&line).unwrap(), entry);
    }
}
