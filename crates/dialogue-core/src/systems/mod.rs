//! Simulation Systems
//!
//! Speaker selection, the dialogue state machine, opinion analysis and
//! rule-based opinion interaction.

pub mod dialogue;
pub mod interaction;
pub mod opinion;
pub mod selection;

pub use dialogue::DialogueSimulator;
pub use interaction::{apply_interaction, InteractionRule, MajorityRule, VoterModel};
pub use opinion::{analysis_prompt, damping, damping_factor, parse_delta, OpinionAnalyzer};
pub use selection::{
    weighted_random_choice, DegreeWeighted, FixedIndex, RoundRobin, SpeakerSelector, UniformRandom,
};
