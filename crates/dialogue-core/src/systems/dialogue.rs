//! Dialogue Simulation
//!
//! Turn-taking over the topology: one speaker per step, delivery to graph
//! neighbors plus the moderator, and a shared append-only history.
//!
//! A step either completes fully or leaves no trace. Everything that can
//! fail (speaker lookup, receiver lookup, message generation) happens before
//! the first mutation.

use rand::RngCore;
use std::collections::{HashMap, HashSet};

use dialogue_events::{generate_event_id, DialogueEvent, EventKind, HistoryEntry, OpinionShift};

use crate::components::agent::{Agent, AgentId, Moderator, Speaker, MODERATOR_NAME};
use crate::components::topology::Topology;
use crate::config::defaults;
use crate::error::SimError;
use crate::events::{EventSink, NullSink};
use crate::systems::interaction::{apply_interaction, InteractionRule};
use crate::systems::opinion::OpinionAnalyzer;
use crate::systems::selection::{SpeakerSelector, UniformRandom};

/// Who hears a message
#[derive(Debug, Clone, Default)]
struct Receivers {
    agents: Vec<usize>,
    moderator: bool,
}

pub struct DialogueSimulator {
    topic: String,
    agents: Vec<Agent>,
    positions: HashMap<AgentId, usize>,
    moderator: Option<Moderator>,
    topology: Topology,
    selector: Box<dyn SpeakerSelector>,
    sink: Box<dyn EventSink>,
    step: u64,
    history: Vec<HistoryEntry>,
    next_event_id: u64,
}

impl DialogueSimulator {
    /// Binds `agents` to `topology`. Agents are kept in id order, which is
    /// also their roster order.
    pub fn new(
        topic: impl Into<String>,
        mut agents: Vec<Agent>,
        moderator: Option<Moderator>,
        topology: Topology,
    ) -> Result<Self, SimError> {
        if agents.len() != topology.node_count() {
            return Err(SimError::AgentCountMismatch {
                nodes: topology.node_count(),
                agents: agents.len(),
            });
        }

        agents.sort_by_key(Agent::id);
        let mut positions = HashMap::with_capacity(agents.len());
        let mut names = HashSet::with_capacity(agents.len() + 1);
        names.insert(MODERATOR_NAME);
        for (position, agent) in agents.iter().enumerate() {
            if !topology.contains(agent.id()) {
                return Err(SimError::UnknownAgent(agent.id()));
            }
            if positions.insert(agent.id(), position).is_some() {
                return Err(SimError::DuplicateAgent(agent.id()));
            }
            // Transcript lines and event receivers are keyed by name
            if !names.insert(agent.name()) {
                return Err(SimError::DuplicateName(agent.name().to_string()));
            }
        }

        Ok(Self {
            topic: topic.into(),
            agents,
            positions,
            moderator,
            topology,
            selector: Box::new(UniformRandom::new(defaults::SEED)),
            sink: Box::new(NullSink),
            step: 0,
            history: Vec::new(),
            next_event_id: 1,
        })
    }

    pub fn with_selector(mut self, selector: impl SpeakerSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn set_selector(&mut self, selector: Box<dyn SpeakerSelector>) {
        self.selector = selector;
    }

    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = sink;
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.positions.get(&id).map(|&p| &self.agents[p])
    }

    pub fn moderator(&self) -> Option<&Moderator> {
        self.moderator.as_ref()
    }

    pub fn moderator_mut(&mut self) -> Option<&mut Moderator> {
        self.moderator.as_mut()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Ordinary agents in id order, then the moderator when present.
    pub fn roster(&self) -> Vec<Speaker> {
        let mut roster: Vec<Speaker> =
            self.agents.iter().map(|a| Speaker::Agent(a.id())).collect();
        if self.moderator.is_some() {
            roster.push(Speaker::Moderator);
        }
        roster
    }

    /// Seeds the conversation without advancing the step counter.
    ///
    /// `None` or `Some(AgentId::MODERATOR)` speaks as the moderator; an empty
    /// message stands for its topic introduction. `Some(id)` broadcasts
    /// `message` from that agent to every agent, itself included, and the
    /// moderator.
    pub fn inject(&mut self, from: Option<AgentId>, message: &str) -> Result<(), SimError> {
        let from = from.filter(|id| !id.is_moderator());
        let (speaker_name, text, receivers) = match from {
            None => {
                let moderator = self.moderator.as_ref().ok_or(SimError::NoModerator)?;
                let text = if message.is_empty() {
                    moderator.topic_introduction()
                } else {
                    message.to_string()
                };
                let receivers = Receivers {
                    agents: (0..self.agents.len()).collect(),
                    moderator: false,
                };
                (MODERATOR_NAME.to_string(), text, receivers)
            }
            Some(id) => {
                let position = self.position_of(id)?;
                let receivers = Receivers {
                    agents: (0..self.agents.len()).collect(),
                    moderator: self.moderator.is_some(),
                };
                (self.agents[position].name().to_string(), message.to_string(), receivers)
            }
        };

        let names = self.deliver(&speaker_name, &text, &receivers);
        tracing::info!(
            step = self.step,
            speaker = %speaker_name,
            receivers = names.len(),
            "injected message"
        );

        self.history.push(HistoryEntry::new(self.step, &speaker_name, &text));
        self.emit(EventKind::Injected {
            speaker: speaker_name,
            message: text,
            receivers: names,
        });
        Ok(())
    }

    /// Runs one turn and returns `(speaker name, message)`.
    pub fn step(&mut self) -> Result<(String, String), SimError> {
        let roster = self.roster();
        let index = self.selector.select(self.step, &roster);
        let speaker = *roster.get(index).ok_or(SimError::SpeakerOutOfRange {
            index,
            len: roster.len(),
        })?;

        let receivers = self.receivers_of(speaker)?;

        let (speaker_name, message) = match speaker {
            Speaker::Moderator => {
                let moderator = self.moderator.as_mut().ok_or(SimError::NoModerator)?;
                (MODERATOR_NAME.to_string(), moderator.send()?)
            }
            Speaker::Agent(id) => {
                let position = self.position_of(id)?;
                let agent = &mut self.agents[position];
                let message = agent.send(&self.topic)?;
                (agent.name().to_string(), message)
            }
        };

        let names = self.deliver(&speaker_name, &message, &receivers);
        tracing::info!(
            step = self.step,
            speaker = %speaker_name,
            receivers = names.len(),
            "step complete"
        );

        self.history.push(HistoryEntry::new(self.step, &speaker_name, &message));
        self.emit(EventKind::Spoke {
            speaker: speaker_name.clone(),
            message: message.clone(),
            receivers: names,
        });
        self.step += 1;

        Ok((speaker_name, message))
    }

    /// Back to step zero: history cleared, every private history reduced to
    /// the sentinel. Opinions are untouched.
    pub fn reset(&mut self) {
        self.step = 0;
        self.history.clear();
        for agent in &mut self.agents {
            agent.reset();
        }
        if let Some(moderator) = self.moderator.as_mut() {
            moderator.reset();
        }
        tracing::info!("simulation reset");
        self.emit(EventKind::Reset);
    }

    /// Runs an opinion pass over the full history and logs one event per
    /// agent. Nothing is committed when the analyzer fails.
    pub fn analyze_opinions(
        &mut self,
        analyzer: &OpinionAnalyzer,
    ) -> Result<Vec<OpinionShift>, SimError> {
        let shifts = analyzer.analyze_opinion_changes(&self.history, &mut self.agents)?;
        for shift in &shifts {
            self.emit(EventKind::OpinionUpdated(shift.clone()));
        }
        Ok(shifts)
    }

    /// One synchronous sweep of `rule` over the topology. Returns how many
    /// opinions changed.
    pub fn interact(
        &mut self,
        rule: &dyn InteractionRule,
        rng: &mut dyn RngCore,
    ) -> Result<usize, SimError> {
        apply_interaction(rule, &self.topology, &mut self.agents, rng)
    }

    pub fn flush_events(&mut self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "failed to flush event sink");
        }
    }

    fn position_of(&self, id: AgentId) -> Result<usize, SimError> {
        self.positions.get(&id).copied().ok_or(SimError::UnknownAgent(id))
    }

    fn receivers_of(&self, speaker: Speaker) -> Result<Receivers, SimError> {
        match speaker {
            Speaker::Moderator => Ok(Receivers {
                agents: (0..self.agents.len()).collect(),
                moderator: false,
            }),
            Speaker::Agent(id) => {
                let agents = self
                    .topology
                    .neighbors(id)?
                    .into_iter()
                    .map(|neighbor| self.position_of(neighbor))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Receivers {
                    agents,
                    moderator: self.moderator.is_some(),
                })
            }
        }
    }

    fn deliver(&mut self, speaker: &str, message: &str, receivers: &Receivers) -> Vec<String> {
        let mut names = Vec::with_capacity(receivers.agents.len() + 1);
        for &position in &receivers.agents {
            let agent = &mut self.agents[position];
            agent.receive(speaker, message);
            tracing::debug!(from = speaker, to = agent.name(), "delivered");
            names.push(agent.name().to_string());
        }
        if receivers.moderator {
            if let Some(moderator) = self.moderator.as_mut() {
                moderator.receive(speaker, message);
                names.push(MODERATOR_NAME.to_string());
            }
        }
        names
    }

    fn emit(&mut self, kind: EventKind) {
        let event = DialogueEvent::new(generate_event_id(self.next_event_id), self.step, kind);
        self.next_event_id += 1;
        if let Err(e) = self.sink.record(&event) {
            tracing::warn!(
                event_id = %event.event_id,
                error = %e,
                "failed to record dialogue event"
            );
        }
    }
}
