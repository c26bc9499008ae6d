//! Interaction Rules
//!
//! Classic opinion dynamics that need no text generation. A sweep computes
//! every new opinion from the pre-sweep state, then commits them together.

use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::HashMap;

use crate::components::agent::{Agent, AgentId};
use crate::components::topology::Topology;
use crate::error::SimError;

/// Maps an agent's opinion and its neighbors' opinions to a new opinion.
pub trait InteractionRule {
    fn name(&self) -> &'static str;

    /// `neighbors` is never empty.
    fn next_opinion(&self, current: f64, neighbors: &[f64], rng: &mut dyn RngCore) -> f64;
}

/// Copy the opinion of one uniformly chosen neighbor
#[derive(Debug, Clone, Copy, Default)]
pub struct VoterModel;

impl InteractionRule for VoterModel {
    fn name(&self) -> &'static str {
        "voter"
    }

    fn next_opinion(&self, current: f64, neighbors: &[f64], rng: &mut dyn RngCore) -> f64 {
        neighbors.choose(rng).copied().unwrap_or(current)
    }
}

/// Adopt +1 or -1 when more neighbors lean that way, otherwise 0
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityRule;

impl InteractionRule for MajorityRule {
    fn name(&self) -> &'static str {
        "majority"
    }

    fn next_opinion(&self, _current: f64, neighbors: &[f64], _rng: &mut dyn RngCore) -> f64 {
        let positive = neighbors.iter().filter(|o| **o > 0.0).count();
        let negative = neighbors.iter().filter(|o| **o < 0.0).count();

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => -1.0,
            std::cmp::Ordering::Equal => 0.0,
        }
    }
}

/// One synchronous sweep over all agents. Returns how many opinions changed.
///
/// Agents without neighbors keep their opinion.
pub fn apply_interaction(
    rule: &dyn InteractionRule,
    topology: &Topology,
    agents: &mut [Agent],
    rng: &mut dyn RngCore,
) -> Result<usize, SimError> {
    let before: HashMap<AgentId, f64> = agents.iter().map(|a| (a.id(), a.opinion())).collect();

    let mut updates = Vec::with_capacity(agents.len());
    for agent in agents.iter() {
        let neighbors = topology
            .neighbors(agent.id())?
            .into_iter()
            .map(|id| before.get(&id).copied().ok_or(SimError::UnknownAgent(id)))
            .collect::<Result<Vec<f64>, _>>()?;

        let next = if neighbors.is_empty() {
            agent.opinion()
        } else {
            rule.next_opinion(agent.opinion(), &neighbors, rng)
        };
        updates.push(next);
    }

    let mut changed = 0;
    for (agent, next) in agents.iter_mut().zip(updates) {
        if agent.opinion() != next {
            changed += 1;
        }
        agent.set_opinion(next);
    }

    tracing::info!(rule = rule.name(), changed, "interaction sweep complete");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TopologyKind, TopologySpec};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn setup(opinions: &[f64], spec: TopologySpec) -> (Topology, Vec<Agent>) {
        let agents: Vec<Agent> = opinions
            .iter()
            .enumerate()
            .map(|(i, o)| Agent::new(AgentId(i as i64), format!("agent_{}", i)).with_opinion(*o))
            .collect();
        let ids: Vec<AgentId> = agents.iter().map(Agent::id).collect();
        let topology = Topology::build(&spec, &ids, &mut SmallRng::seed_from_u64(0)).unwrap();
        (topology, agents)
    }

    #[test]
    fn test_voter_leaf_copies_hub() {
        let (topology, mut agents) = setup(&[0.8, -0.4, 0.1], TopologySpec::star(3).unwrap());
        let mut rng = SmallRng::seed_from_u64(5);

        apply_interaction(&VoterModel, &topology, &mut agents, &mut rng).unwrap();

        // Leaves have only the hub as neighbor and read the pre-sweep value
        assert_eq!(agents[1].opinion(), 0.8);
        assert_eq!(agents[2].opinion(), 0.8);
        assert!(agents[0].opinion() == -0.4 || agents[0].opinion() == 0.1);
    }

    #[test]
    fn test_majority_rule() {
        let (topology, mut agents) =
            setup(&[0.0, 0.5, 0.3, -0.9], TopologySpec::star(4).unwrap());
        let mut rng = SmallRng::seed_from_u64(0);

        let changed = apply_interaction(&MajorityRule, &topology, &mut agents, &mut rng).unwrap();

        // Hub sees two positive and one negative neighbor
        assert_eq!(agents[0].opinion(), 1.0);
        // Every leaf sees the hub at 0.0: a tie
        assert!(agents[1..].iter().all(|a| a.opinion() == 0.0));
        assert_eq!(changed, 4);
    }

    #[test]
    fn test_majority_tie_is_neutral() {
        let rule = MajorityRule;
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(rule.next_opinion(0.7, &[0.5, -0.5], &mut rng), 0.0);
        assert_eq!(rule.next_opinion(0.7, &[0.0, 0.0], &mut rng), 0.0);
    }

    #[test]
    fn test_consensus_is_stable() {
        let spec = TopologySpec::new(TopologyKind::SmallWorld, 8, 4, 0.2, 1).unwrap();
        let (topology, mut agents) = setup(&[0.6; 8], spec);
        let mut rng = SmallRng::seed_from_u64(9);

        let changed = apply_interaction(&VoterModel, &topology, &mut agents, &mut rng).unwrap();

        assert_eq!(changed, 0);
        assert!(agents.iter().all(|a| a.opinion() == 0.6));
    }

    #[test]
    fn test_unknown_agent_fails_before_commit() {
        let (topology, _) = setup(&[0.0, 0.0], TopologySpec::star(2).unwrap());
        let mut agents = vec![
            Agent::new(AgentId(0), "a").with_opinion(0.5),
            Agent::new(AgentId(7), "b").with_opinion(-0.5),
        ];
        let mut rng = SmallRng::seed_from_u64(0);

        let result = apply_interaction(&VoterModel, &topology, &mut agents, &mut rng);
        assert!(result.is_err());
        assert_eq!(agents[0].opinion(), 0.5);
    }
}
