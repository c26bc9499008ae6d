//! Simulation Components
//!
//! Participants, personas and the graph connecting them.

pub mod agent;
pub mod persona;
pub mod topology;

pub use agent::*;
pub use persona::*;
pub use topology::*;
