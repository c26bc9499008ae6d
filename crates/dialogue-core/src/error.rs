//! Runtime errors raised by the simulation.

use thiserror::Error;

use crate::components::agent::AgentId;
use crate::components::persona::PersonaError;
use crate::config::ConfigError;
use crate::llm::GenerationError;

#[derive(Debug, Error)]
pub enum SimError {
    /// A participant was asked to speak before a generator was attached
    #[error("{name} has no message generator attached")]
    ModelMissing { name: String },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("no agent with id {0}")]
    UnknownAgent(AgentId),
    #[error("no moderator is present in this simulation")]
    NoModerator,
    #[error("speaker selector returned index {index} for a roster of {len}")]
    SpeakerOutOfRange { index: usize, len: usize },
    #[error("topology expects {nodes} agents but {agents} were supplied")]
    AgentCountMismatch { nodes: usize, agents: usize },
    #[error("agent id {0} appears more than once")]
    DuplicateAgent(AgentId),
    /// Agent names must be unique and differ from the moderator's
    #[error("agent name {0:?} is already taken")]
    DuplicateName(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid persona: {0}")]
    Persona(#[from] PersonaError),
}
