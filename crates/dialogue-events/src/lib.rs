//! Shared conversation and event types for the dialogue simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The simulation core writes these types; any downstream tooling (log
//! readers, dashboards, analysis scripts) only needs this crate.

pub mod event;
pub mod history;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export history types
pub use history::{format_transcript, HistoryEntry};

// Re-export event types
pub use event::{generate_event_id, DialogueEvent, EventKind, OpinionShift};

// Re-export snapshot types
pub use snapshot::{
    generate_run_id, AgentSnapshot, OpinionDistribution, OpinionStats, RunSnapshot,
};
