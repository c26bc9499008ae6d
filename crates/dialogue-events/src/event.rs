//! Dialogue Events
//!
//! Structured records of everything that changes simulation state. One event
//! is emitted per injection, per completed step, per committed opinion change
//! and per reset.

use serde::{Deserialize, Serialize};

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

/// An opinion change committed to one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionShift {
    pub agent_id: i64,
    pub agent_name: String,
    /// Opinion before the update
    pub before: f64,
    /// Delta parsed from the analysis response, clamped to [-1, 1]
    pub raw_delta: f64,
    /// Delta after personality damping
    pub applied_delta: f64,
    /// Opinion after the update, clamped to [-1, 1]
    pub after: f64,
    /// Whether the analysis response could not be parsed as a number
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unparsed: bool,
}

impl OpinionShift {
    /// Magnitude of the committed change.
    pub fn magnitude(&self) -> f64 {
        (self.after - self.before).abs()
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A message seeded into the conversation without advancing the step
    Injected {
        speaker: String,
        message: String,
        receivers: Vec<String>,
    },
    /// A completed simulation step
    Spoke {
        speaker: String,
        message: String,
        receivers: Vec<String>,
    },
    /// One agent's opinion was updated by an analysis pass
    OpinionUpdated(OpinionShift),
    /// The simulation was returned to step zero
    Reset,
}

/// A single logged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueEvent {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// Simulation step at which the event was recorded
    pub step: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl DialogueEvent {
    pub fn new(event_id: impl Into<String>, step: u64, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            step,
            kind,
        }
    }

    /// Name of the speaker for utterance events.
    pub fn speaker(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Injected { speaker, .. } | EventKind::Spoke { speaker, .. } => {
                Some(speaker)
            }
            _ => None,
        }
    }

    /// Checks whether the named participant received this utterance.
    pub fn delivered_to(&self, name: &str) -> bool {
        match &self.kind {
            EventKind::Injected { receivers, .. } | EventKind::Spoke { receivers, .. } => {
                receivers.iter().any(|r| r == name)
            }
            _ => false,
        }
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
