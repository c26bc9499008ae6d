//! Agent Creation
//!
//! Builds the population of a run: persona-backed agents with unique names
//! and persona-derived starting opinions, plus the moderator.

use rand::Rng;
use std::collections::HashMap;

use crate::components::agent::{Agent, AgentId, Moderator};
use crate::components::persona::{initial_opinion, Persona, PersonaError};
use crate::setup::personas::{generate_persona, PersonaTemplate};

pub struct AgentFactory;

impl AgentFactory {
    /// Agent with an explicit persona and a persona-derived opinion.
    pub fn create_agent<R: Rng + ?Sized>(
        id: AgentId,
        persona: Persona,
        rng: &mut R,
    ) -> Agent {
        let opinion = initial_opinion(Some(&persona), rng);
        Agent::new(id, persona.name())
            .with_opinion(opinion)
            .with_persona(persona)
    }

    /// `count` agents with ids `0..count`.
    ///
    /// A name drawn twice gets a numeric suffix, so names stay unique.
    pub fn create_agents<R: Rng + ?Sized>(
        count: usize,
        template: &PersonaTemplate,
        rng: &mut R,
    ) -> Result<Vec<Agent>, PersonaError> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut agents = Vec::with_capacity(count);

        for index in 0..count {
            let mut persona = generate_persona(template, rng)?;

            let occurrences = seen.entry(persona.name().to_string()).or_insert(0);
            *occurrences += 1;
            if *occurrences > 1 {
                let unique = format!("{} {}", persona.name(), occurrences);
                persona = Persona::new(unique, persona.age(), persona.traits(), persona.status())?;
                seen.insert(persona.name().to_string(), 1);
            }

            let agent = Self::create_agent(AgentId(index as i64), persona, rng);
            tracing::debug!(
                id = %agent.id(),
                name = agent.name(),
                opinion = agent.opinion(),
                "created agent"
            );
            agents.push(agent);
        }

        Ok(agents)
    }

    pub fn create_moderator(topic: impl Into<String>) -> Moderator {
        Moderator::new(topic)
    }
}
