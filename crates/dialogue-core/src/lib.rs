//! Multi-agent dialogue over a social graph, with opinions that drift as
//! the conversation unfolds.

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod offline;
pub mod output;
pub mod runner;
pub mod setup;
pub mod systems;

pub use components::{Agent, AgentId, Moderator, Persona, Speaker, Topology};
pub use config::{ConfigError, ModelType, SimulationConfig, TopologyKind, TopologySpec};
pub use error::SimError;
pub use llm::{GenerationError, MessageGenerator, SpeakerPrompt, TextGenerator};
pub use runner::{RunSummary, SimulationRunner, StepReport};
pub use systems::{DialogueSimulator, OpinionAnalyzer};
