//! Simulation Runner
//!
//! Drives a configured run: moderator introduction, `num_rounds` steps, and
//! an opinion pass after every step the analyzer asks for.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use dialogue_events::{generate_run_id, OpinionShift, RunSnapshot};

use crate::components::agent::AgentId;
use crate::components::topology::Topology;
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::offline::{CannedSpeaker, KeywordJudge};
use crate::output::snapshot::generate_snapshot_with_id;
use crate::setup::agents::AgentFactory;
use crate::setup::personas::PersonaTemplate;
use crate::systems::dialogue::DialogueSimulator;
use crate::systems::opinion::OpinionAnalyzer;
use crate::systems::selection::UniformRandom;

/// What happened in one round, handed to the caller's observer.
#[derive(Debug, Clone, Copy)]
pub struct StepReport<'a> {
    /// 1-based round number
    pub round: u64,
    pub speaker: &'a str,
    pub message: &'a str,
    /// Empty unless an opinion pass ran after this round
    pub shifts: &'a [OpinionShift],
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub steps: u64,
    pub history_len: usize,
    pub opinion_passes: usize,
    pub snapshot: RunSnapshot,
}

pub struct SimulationRunner {
    config: SimulationConfig,
    simulator: DialogueSimulator,
    analyzer: OpinionAnalyzer,
    run_id: String,
}

impl SimulationRunner {
    pub fn new(
        config: SimulationConfig,
        simulator: DialogueSimulator,
        analyzer: OpinionAnalyzer,
    ) -> Self {
        Self {
            config,
            simulator,
            analyzer,
            run_id: generate_run_id(),
        }
    }

    /// Wires a run with the offline collaborators. Every random choice
    /// derives from the configured seed.
    pub fn from_config(config: SimulationConfig) -> Result<Self, SimError> {
        let seed = config.seed();
        let mut rng = SmallRng::seed_from_u64(seed);

        let template = PersonaTemplate::default();
        let mut agents = AgentFactory::create_agents(config.num_agents(), &template, &mut rng)?;
        for agent in &mut agents {
            let speaker_seed = seed.wrapping_add(agent.id().0 as u64 + 1);
            agent.attach_generator(Box::new(CannedSpeaker::new(speaker_seed)));
        }

        let ids: Vec<AgentId> = agents.iter().map(|a| a.id()).collect();
        let topology = Topology::build(&config.topology_spec(), &ids, &mut rng)?;

        let moderator = config.with_moderator().then(|| {
            AgentFactory::create_moderator(config.topic()).with_generator(CannedSpeaker::new(seed))
        });

        let simulator = DialogueSimulator::new(config.topic(), agents, moderator, topology)?
            .with_selector(UniformRandom::new(seed));
        let analyzer = OpinionAnalyzer::new(KeywordJudge, config.opinion_update_frequency())?;

        tracing::info!(
            agents = config.num_agents(),
            topology = %config.topology(),
            model = %config.model_type(),
            seed,
            "simulation ready"
        );

        Ok(Self::new(config, simulator, analyzer))
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn simulator(&self) -> &DialogueSimulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut DialogueSimulator {
        &mut self.simulator
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Snapshot of the current state under this run's id
    pub fn snapshot(&self) -> RunSnapshot {
        generate_snapshot_with_id(&self.simulator, self.run_id.clone())
    }

    /// Runs the configured number of rounds, calling `on_step` after each.
    ///
    /// Stops at the first error; rounds already completed stay applied.
    pub fn run<F>(&mut self, mut on_step: F) -> Result<RunSummary, SimError>
    where
        F: FnMut(&StepReport<'_>),
    {
        if self.simulator.moderator().is_some() {
            self.simulator.inject(None, "")?;
        }

        let mut opinion_passes = 0;
        for round in 1..=self.config.num_rounds() {
            let (speaker, message) = self.simulator.step()?;

            let shifts = if self.analyzer.should_update(self.simulator.step_count()) {
                opinion_passes += 1;
                self.simulator.analyze_opinions(&self.analyzer)?
            } else {
                Vec::new()
            };

            on_step(&StepReport {
                round,
                speaker: &speaker,
                message: &message,
                shifts: &shifts,
            });
        }

        self.simulator.flush_events();

        let snapshot = self.snapshot();
        tracing::info!(
            steps = self.simulator.step_count(),
            opinion_passes,
            average_opinion = snapshot.stats.average,
            "run complete"
        );

        Ok(RunSummary {
            steps: self.simulator.step_count(),
            history_len: self.simulator.history().len(),
            opinion_passes,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyKind;

    fn config(rounds: u64, frequency: u64, with_moderator: bool) -> SimulationConfig {
        SimulationConfig::builder(4, "Should the town square be pedestrianised?", rounds)
            .topology(TopologyKind::Star)
            .opinion_update_frequency(frequency)
            .with_moderator(with_moderator)
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_counts() {
        let mut runner = SimulationRunner::from_config(config(10, 5, true)).unwrap();
        let mut rounds = Vec::new();
        let summary = runner.run(|report| rounds.push(report.round)).unwrap();

        assert_eq!(rounds, (1..=10).collect::<Vec<_>>());
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.history_len, 11);
        assert_eq!(summary.opinion_passes, 2);
        assert_eq!(summary.snapshot.agents.len(), 4);
        assert_eq!(summary.snapshot.run_id, runner.run_id());
    }

    #[test]
    fn test_run_without_moderator() {
        let mut runner = SimulationRunner::from_config(config(3, 5, false)).unwrap();
        let summary = runner.run(|_| {}).unwrap();

        assert_eq!(summary.history_len, 3);
        assert_eq!(summary.opinion_passes, 0);
        assert!(runner.simulator().moderator().is_none());
    }

    #[test]
    fn test_shifts_reported_on_pass_rounds() {
        let mut runner = SimulationRunner::from_config(config(4, 2, true)).unwrap();
        let mut passes = Vec::new();
        runner
            .run(|report| {
                if !report.shifts.is_empty() {
                    passes.push(report.round);
                    assert_eq!(report.shifts.len(), 4);
                }
            })
            .unwrap();

        assert_eq!(passes, vec![2, 4]);
    }

    #[test]
    fn test_same_seed_same_transcript() {
        let transcript = |seed: u64| {
            let config = SimulationConfig::builder(5, "Remote work", 8)
                .seed(seed)
                .build()
                .unwrap();
            let mut runner = SimulationRunner::from_config(config).unwrap();
            runner.run(|_| {}).unwrap();
            runner.simulator().history().to_vec()
        };

        assert_eq!(transcript(7), transcript(7));
    }
}
