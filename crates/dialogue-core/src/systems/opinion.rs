//! Opinion Analysis
//!
//! Periodic pass that asks a text generator how far the conversation moved
//! each agent, damps the answer by the agent's opinion rigidity, and commits
//! the clamped result.
//!
//! The pass is all-or-nothing: every delta is obtained before any opinion
//! changes, so a generator failure leaves all agents as they were.

use dialogue_events::{format_transcript, HistoryEntry, OpinionShift};

use crate::components::agent::Agent;
use crate::components::persona::vocabulary;
use crate::config::ConfigError;
use crate::error::SimError;
use crate::llm::TextGenerator;

/// Multipliers applied to a raw delta, checked in declaration order
pub mod damping {
    pub const STRONGLY_HELD: f64 = 0.3;
    pub const WEAKLY_HELD: f64 = 1.5;
    pub const CLOSED_MINDED: f64 = 0.4;
    pub const OPEN_MINDED: f64 = 1.2;
}

const RIGIDITY: [(&str, f64); 4] = [
    (vocabulary::STRONGLY_HELD, damping::STRONGLY_HELD),
    (vocabulary::WEAKLY_HELD, damping::WEAKLY_HELD),
    (vocabulary::CLOSED_MINDED, damping::CLOSED_MINDED),
    (vocabulary::OPEN_MINDED, damping::OPEN_MINDED),
];

pub struct OpinionAnalyzer {
    generator: Box<dyn TextGenerator>,
    update_frequency: u64,
}

impl OpinionAnalyzer {
    pub fn new(
        generator: impl TextGenerator + 'static,
        update_frequency: u64,
    ) -> Result<Self, ConfigError> {
        if update_frequency == 0 {
            return Err(ConfigError::ZeroUpdateFrequency);
        }
        Ok(Self {
            generator: Box::new(generator),
            update_frequency,
        })
    }

    pub fn update_frequency(&self) -> u64 {
        self.update_frequency
    }

    /// True on every multiple of the update frequency, including step 0.
    pub fn should_update(&self, step: u64) -> bool {
        step % self.update_frequency == 0
    }

    /// Updates every agent's opinion from the shared history and returns
    /// one shift per agent, in agent order.
    pub fn analyze_opinion_changes(
        &self,
        history: &[HistoryEntry],
        agents: &mut [Agent],
    ) -> Result<Vec<OpinionShift>, SimError> {
        let transcript = format_transcript(history);

        let mut answers = Vec::with_capacity(agents.len());
        for agent in agents.iter() {
            let prompt = analysis_prompt(agent.name(), agent.traits(), &transcript);
            let response = self.generator.generate_response(&prompt)?;
            answers.push(parse_delta(&response));
        }

        let mut shifts = Vec::with_capacity(agents.len());
        for (agent, answer) in agents.iter_mut().zip(answers) {
            let (raw_delta, unparsed) = match answer {
                Some(delta) => (delta, false),
                None => {
                    tracing::warn!(
                        agent = agent.name(),
                        "opinion response was not a number, using 0.0"
                    );
                    (0.0, true)
                }
            };

            let applied_delta = raw_delta * damping_factor(agent.traits());
            let before = agent.opinion();
            agent.set_opinion(before + applied_delta);

            tracing::debug!(
                agent = agent.name(),
                before,
                raw_delta,
                applied_delta,
                after = agent.opinion(),
                "opinion updated"
            );

            shifts.push(OpinionShift {
                agent_id: agent.id().0,
                agent_name: agent.name().to_string(),
                before,
                raw_delta,
                applied_delta,
                after: agent.opinion(),
                unparsed,
            });
        }

        tracing::info!(
            agents = shifts.len(),
            history = history.len(),
            "opinion pass complete"
        );
        Ok(shifts)
    }
}

/// Prompt asking for a single number in [-1, 1]; positive means movement
/// toward the status quo.
pub fn analysis_prompt(name: &str, traits: Option<&str>, transcript: &str) -> String {
    format!(
        "Analyze how {name}'s opinion might change based on this conversation.\n\
         Agent traits: {traits}\n\
         \n\
         Recent conversation:\n\
         {transcript}\n\
         \n\
         Rate the opinion change from -1 (strongly moved toward change) \
         to +1 (strongly moved toward status-quo).\n\
         Return only a number between -1 and 1.",
        name = name,
        traits = traits.unwrap_or("unknown"),
        transcript = transcript,
    )
}

/// Reads a delta from a generator response, clamped to [-1, 1].
///
/// `None` for anything that is not a finite number.
pub fn parse_delta(response: &str) -> Option<f64> {
    response
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|delta| delta.is_finite())
        .map(|delta| delta.clamp(-1.0, 1.0))
}

/// Multiplier for the first rigidity keyword found in `traits`; 1.0 when
/// none is present.
pub fn damping_factor(traits: Option<&str>) -> f64 {
    let Some(traits) = traits else {
        return 1.0;
    };
    let traits = traits.to_lowercase();
    RIGIDITY
        .iter()
        .find(|(keyword, _)| traits.contains(keyword))
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0)
}
