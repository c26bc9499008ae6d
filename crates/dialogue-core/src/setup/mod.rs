//! Simulation Setup
//!
//! Persona generation and agent creation.

pub mod agents;
pub mod personas;

pub use agents::*;
pub use personas::*;
