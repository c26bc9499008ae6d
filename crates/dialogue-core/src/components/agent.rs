//! Agent Components
//!
//! Ordinary agents, the moderator, and the tagged [`Speaker`] that lets the
//! simulator tell them apart.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::persona::Persona;
use crate::error::SimError;
use crate::llm::{MessageGenerator, SpeakerPrompt};

/// First entry of every private message history.
pub const HISTORY_SENTINEL: &str = "Here is the conversation so far.";

/// Display name of the moderator.
pub const MODERATOR_NAME: &str = "Mediator";

/// Unique identifier for a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub i64);

impl AgentId {
    /// Reserved id of the moderator
    pub const MODERATOR: AgentId = AgentId(-1);

    pub fn is_moderator(&self) -> bool {
        *self == Self::MODERATOR
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A roster entry: either an ordinary agent or the moderator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    Agent(AgentId),
    Moderator,
}

impl Speaker {
    pub fn id(&self) -> AgentId {
        match self {
            Speaker::Agent(id) => *id,
            Speaker::Moderator => AgentId::MODERATOR,
        }
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self, Speaker::Moderator)
    }
}

fn fresh_history() -> Vec<String> {
    vec![HISTORY_SENTINEL.to_string()]
}

fn delivery_line(speaker: &str, message: &str) -> String {
    format!("{}: {}", speaker, message)
}

/// An ordinary discussion participant.
pub struct Agent {
    id: AgentId,
    name: String,
    persona: Option<Persona>,
    /// Stance in [-1, 1]; -1 change-oriented, +1 status-quo
    opinion: f64,
    messages: Vec<String>,
    generator: Option<Box<dyn MessageGenerator>>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("persona", &self.persona)
            .field("opinion", &self.opinion)
            .field("messages", &self.messages.len())
            .field("has_generator", &self.generator.is_some())
            .finish()
    }
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            persona: None,
            opinion: 0.0,
            messages: fresh_history(),
            generator: None,
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    pub fn with_opinion(mut self, opinion: f64) -> Self {
        self.set_opinion(opinion);
        self
    }

    pub fn with_generator(mut self, generator: impl MessageGenerator + 'static) -> Self {
        self.attach_generator(Box::new(generator));
        self
    }

    pub fn attach_generator(&mut self, generator: Box<dyn MessageGenerator>) {
        self.generator = Some(generator);
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    /// Trait string of the persona, if any.
    pub fn traits(&self) -> Option<&str> {
        self.persona.as_ref().map(Persona::traits)
    }

    pub fn opinion(&self) -> f64 {
        self.opinion
    }

    /// Sets the opinion, clamped to [-1, 1]. NaN is ignored.
    pub fn set_opinion(&mut self, opinion: f64) {
        if opinion.is_nan() {
            return;
        }
        self.opinion = opinion.clamp(-1.0, 1.0);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Appends a delivered message to the private history.
    pub fn receive(&mut self, speaker: &str, message: &str) {
        self.messages.push(delivery_line(speaker, message));
    }

    /// Restores the private history to the sentinel. Opinion is kept.
    pub fn reset(&mut self) {
        self.messages = fresh_history();
    }

    /// Framing handed to the generator on every turn.
    pub fn system_message(&self, topic: &str) -> String {
        let mut framing = format!(
            "Your name is {}. You are taking part in a conversation about: {}.\n",
            self.name, topic
        );
        if let Some(persona) = &self.persona {
            framing.push_str(&persona.describe());
            framing.push('\n');
        }
        framing.push_str(
            "Speak in the first person and stay in character. \
             Keep each reply to a few sentences and never speak for anyone else.",
        );
        framing
    }

    /// Asks the attached generator for this agent's next message.
    ///
    /// Does not touch the agent's own history.
    pub fn send(&mut self, topic: &str) -> Result<String, SimError> {
        let system_message = self.system_message(topic);
        let generator = self.generator.as_mut().ok_or_else(|| SimError::ModelMissing {
            name: self.name.clone(),
        })?;

        let prompt = SpeakerPrompt {
            speaker: &self.name,
            system_message: &system_message,
            history: &self.messages,
        };
        Ok(generator.generate(&prompt)?)
    }
}

/// The distinguished participant that introduces the topic, may broadcast,
/// and hears everything.
pub struct Moderator {
    topic: String,
    messages: Vec<String>,
    generator: Option<Box<dyn MessageGenerator>>,
}

impl fmt::Debug for Moderator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Moderator")
            .field("topic", &self.topic)
            .field("messages", &self.messages.len())
            .field("has_generator", &self.generator.is_some())
            .finish()
    }
}

impl Moderator {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            messages: fresh_history(),
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: impl MessageGenerator + 'static) -> Self {
        self.attach_generator(Box::new(generator));
        self
    }

    pub fn attach_generator(&mut self, generator: Box<dyn MessageGenerator>) {
        self.generator = Some(generator);
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn id(&self) -> AgentId {
        AgentId::MODERATOR
    }

    pub fn name(&self) -> &str {
        MODERATOR_NAME
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Text broadcast when the moderator opens the conversation.
    pub fn topic_introduction(&self) -> String {
        format!(
            "This is a simulated environment where agents communicate with each other. \
             The MediatingAgent initiates and moderates the conversations. \
             It ensures a smooth flow and sets the topic of discussion. \
             The topic of discussion is: {}.",
            self.topic
        )
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn receive(&mut self, speaker: &str, message: &str) {
        self.messages.push(delivery_line(speaker, message));
    }

    pub fn reset(&mut self) {
        self.messages = fresh_history();
    }

    pub fn send(&mut self) -> Result<String, SimError> {
        let system_message = self.topic_introduction();
        let generator = self.generator.as_mut().ok_or_else(|| SimError::ModelMissing {
            name: MODERATOR_NAME.to_string(),
        })?;

        let prompt = SpeakerPrompt {
            speaker: MODERATOR_NAME,
            system_message: &system_message,
            history: &self.messages,
        };
        Ok(generator.generate(&prompt)?)
    }
}
