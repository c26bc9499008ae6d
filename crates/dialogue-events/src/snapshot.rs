//! Snapshot Types
//!
//! Serialization structs for the state of a run at a point in time, used for
//! analysis and debugging.

use serde::{Deserialize, Serialize};

/// Generates a fresh run identifier.
pub fn generate_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Per-agent state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: i64,
    pub name: String,
    pub opinion: f64,
    /// Length of the agent's private message history, sentinel included
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Opinion buckets: positive (> 1/3), neutral, negative (< -1/3)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl OpinionDistribution {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Aggregate opinion statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpinionStats {
    pub average: f64,
    /// Population standard deviation
    pub spread: f64,
    pub distribution: OpinionDistribution,
}

/// Complete run snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: String,
    pub topic: String,
    pub step: u64,
    pub history_len: usize,
    pub agents: Vec<AgentSnapshot>,
    pub stats: OpinionStats,
}

impl RunSnapshot {
    /// Looks up an agent by name.
    pub fn agent(&self, name: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
