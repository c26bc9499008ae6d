//! Speaker Selection
//!
//! Policies that pick the next speaker as an index into the roster of
//! ordinary agents (id order) followed by the moderator, when present.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use crate::components::agent::{AgentId, Speaker};
use crate::components::topology::Topology;

/// Chooses who speaks at `step`.
///
/// Implementations must not assume the returned index is trusted: the
/// simulator rejects anything outside `0..roster.len()`.
pub trait SpeakerSelector {
    fn select(&mut self, step: u64, roster: &[Speaker]) -> usize;
}

impl<F> SpeakerSelector for F
where
    F: FnMut(u64, &[Speaker]) -> usize,
{
    fn select(&mut self, step: u64, roster: &[Speaker]) -> usize {
        self(step, roster)
    }
}

/// Uniform choice over the whole roster
#[derive(Debug, Clone)]
pub struct UniformRandom {
    rng: SmallRng,
}

impl UniformRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl SpeakerSelector for UniformRandom {
    fn select(&mut self, _step: u64, roster: &[Speaker]) -> usize {
        if roster.is_empty() {
            return 0;
        }
        self.rng.gen_range(0..roster.len())
    }
}

/// Cycles through the roster in order
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl SpeakerSelector for RoundRobin {
    fn select(&mut self, step: u64, roster: &[Speaker]) -> usize {
        if roster.is_empty() {
            return 0;
        }
        (step % roster.len() as u64) as usize
    }
}

/// Always the same roster slot
#[derive(Debug, Clone, Copy)]
pub struct FixedIndex(pub usize);

impl SpeakerSelector for FixedIndex {
    fn select(&mut self, _step: u64, _roster: &[Speaker]) -> usize {
        self.0
    }
}

/// Favors well-connected agents: weight is topology degree, the moderator
/// weighs as much as the number of ordinary agents.
#[derive(Debug, Clone)]
pub struct DegreeWeighted {
    degrees: HashMap<AgentId, usize>,
    moderator_weight: f64,
    rng: SmallRng,
}

impl DegreeWeighted {
    pub fn new(topology: &Topology, seed: u64) -> Self {
        let degrees = topology
            .agents()
            .map(|id| (id, topology.degree(id).unwrap_or(0)))
            .collect();

        Self {
            degrees,
            moderator_weight: topology.node_count() as f64,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn weight(&self, speaker: &Speaker) -> f64 {
        match speaker {
            Speaker::Moderator => self.moderator_weight,
            Speaker::Agent(id) => self.degrees.get(id).copied().unwrap_or(0) as f64,
        }
    }
}

impl SpeakerSelector for DegreeWeighted {
    fn select(&mut self, _step: u64, roster: &[Speaker]) -> usize {
        let weights: Vec<f64> = roster.iter().map(|s| self.weight(s)).collect();
        weighted_random_choice(&mut self.rng, &weights)
    }
}

/// Index drawn with probability proportional to its weight.
///
/// Falls back to 0 when no weight is positive.
pub fn weighted_random_choice<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    let total_weight: f64 = weights.iter().filter(|w| **w > 0.0).sum();

    if weights.is_empty() || total_weight <= 0.0 {
        return 0;
    }

    let mut roll = rng.gen::<f64>() * total_weight;

    for (index, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        roll -= weight;
        if roll <= 0.0 {
            return index;
        }
    }

    // Rounding left a sliver; take the last positive slot
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}
