//! Persona Components
//!
//! Categorical traits, age and status of a participant, plus the mapping
//! from traits to a starting opinion.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trait keywords with meaning for opinion dynamics.
pub mod vocabulary {
    /// Leans toward change; opinions start negative
    pub const CHANGE_ORIENTED: &str = "change-oriented";
    /// Leans toward the status quo; opinions start positive
    pub const STATUS_QUO: &str = "status-quo";
    pub const UNDECIDED: &str = "undecided";
    pub const STRONGLY_HELD: &str = "strongly held";
    pub const WEAKLY_HELD: &str = "weakly held";
    pub const CLOSED_MINDED: &str = "closed-minded";
    pub const OPEN_MINDED: &str = "open-minded";
}

/// Constants for persona-derived opinions
pub mod opinion_constants {
    /// Base opinion for change-oriented personas
    pub const CHANGE_BASE: f64 = -0.7;
    /// Base opinion for status-quo personas
    pub const STATUS_QUO_BASE: f64 = 0.7;
    /// Half-width of the uniform jitter added to the base
    pub const JITTER: f64 = 0.2;
}

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 80;

#[derive(Debug, Error, PartialEq)]
pub enum PersonaError {
    #[error("persona name must be 2-100 characters, got {0:?}")]
    InvalidName(String),
    #[error("persona age must be between 18 and 80, got {0}")]
    InvalidAge(u8),
}

/// Who a participant is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    name: String,
    age: u8,
    /// Comma-joined trait tags, e.g. "introvert, sanguine, status-quo"
    traits: String,
    status: String,
}

impl Persona {
    pub fn new(
        name: impl Into<String>,
        age: u8,
        traits: impl Into<String>,
        status: impl Into<String>,
    ) -> Result<Self, PersonaError> {
        let name = name.into().trim().to_string();
        let name_len = name.chars().count();
        if !(2..=100).contains(&name_len) {
            return Err(PersonaError::InvalidName(name));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(PersonaError::InvalidAge(age));
        }

        Ok(Self {
            name,
            age,
            traits: traits.into(),
            status: status.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn traits(&self) -> &str {
        &self.traits
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Individual trait tags, trimmed.
    pub fn trait_list(&self) -> impl Iterator<Item = &str> {
        self.traits
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Case-insensitive keyword search over the trait string.
    pub fn has_trait(&self, keyword: &str) -> bool {
        self.traits.to_lowercase().contains(&keyword.to_lowercase())
    }

    /// One-line description used in system prompts.
    pub fn describe(&self) -> String {
        format!(
            "{} is {} years old ({}). Innate traits: {}.",
            self.name, self.age, self.status, self.traits
        )
    }
}

/// Derives a starting opinion in [-1, 1] from persona traits.
///
/// Without a persona, or with an empty trait string, the result is exactly
/// 0.0 and the RNG is not consumed.
pub fn initial_opinion<R: Rng + ?Sized>(persona: Option<&Persona>, rng: &mut R) -> f64 {
    let Some(traits) = persona
        .map(Persona::traits)
        .filter(|t| !t.trim().is_empty())
    else {
        return 0.0;
    };

    let traits = traits.to_lowercase();
    let base = if traits.contains(vocabulary::CHANGE_ORIENTED) {
        opinion_constants::CHANGE_BASE
    } else if traits.contains(vocabulary::STATUS_QUO) {
        opinion_constants::STATUS_QUO_BASE
    } else {
        0.0
    };

    let jitter = rng.gen_range(-opinion_constants::JITTER..=opinion_constants::JITTER);
    (base + jitter).clamp(-1.0, 1.0)
}
