//! Opinion Statistics
//!
//! Aggregates over agent opinions. Empty input yields zeros.

use dialogue_events::{OpinionDistribution, OpinionStats};

use crate::components::agent::Agent;

/// Opinions beyond this magnitude count as positive or negative
pub const LEANING_THRESHOLD: f64 = 1.0 / 3.0;

pub fn average_opinion(agents: &[Agent]) -> f64 {
    if agents.is_empty() {
        return 0.0;
    }
    agents.iter().map(Agent::opinion).sum::<f64>() / agents.len() as f64
}

pub fn opinion_distribution(agents: &[Agent]) -> OpinionDistribution {
    let mut distribution = OpinionDistribution::default();
    for agent in agents {
        let opinion = agent.opinion();
        if opinion > LEANING_THRESHOLD {
            distribution.positive += 1;
        } else if opinion < -LEANING_THRESHOLD {
            distribution.negative += 1;
        } else {
            distribution.neutral += 1;
        }
    }
    distribution
}

/// Population standard deviation
pub fn opinion_spread(agents: &[Agent]) -> f64 {
    if agents.is_empty() {
        return 0.0;
    }
    let mean = average_opinion(agents);
    let variance = agents
        .iter()
        .map(|a| (a.opinion() - mean).powi(2))
        .sum::<f64>()
        / agents.len() as f64;
    variance.sqrt()
}

pub fn opinion_stats(agents: &[Agent]) -> OpinionStats {
    OpinionStats {
        average: average_opinion(agents),
        spread: opinion_spread(agents),
        distribution: opinion_distribution(agents),
    }
}
