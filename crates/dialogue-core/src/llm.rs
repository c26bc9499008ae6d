//! Text Generation Collaborators
//!
//! The simulation never talks to a model directly. Speakers get their lines
//! from a [`MessageGenerator`], and the opinion analyzer asks a
//! [`TextGenerator`] for single-shot completions. Transports, timeouts and
//! retries belong to the implementations.

use std::error::Error as StdError;
use thiserror::Error;

/// Failure reported by a generator.
#[derive(Debug, Error)]
#[error("generation failed: {message}")]
pub struct GenerationError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Everything a speaker's generator sees when asked for its next line.
#[derive(Debug, Clone, Copy)]
pub struct SpeakerPrompt<'a> {
    pub speaker: &'a str,
    /// Framing text describing who the speaker is and what is discussed
    pub system_message: &'a str,
    /// The speaker's private message history, oldest first
    pub history: &'a [String],
}

impl SpeakerPrompt<'_> {
    /// The most recent message the speaker received, if any beyond the sentinel.
    pub fn last_heard(&self) -> Option<&str> {
        self.history.iter().skip(1).last().map(String::as_str)
    }
}

/// Produces a speaker's next message.
pub trait MessageGenerator: Send {
    fn generate(&mut self, prompt: &SpeakerPrompt<'_>) -> Result<String, GenerationError>;
}

impl<F> MessageGenerator for F
where
    F: FnMut(&SpeakerPrompt<'_>) -> Result<String, GenerationError> + Send,
{
    fn generate(&mut self, prompt: &SpeakerPrompt<'_>) -> Result<String, GenerationError> {
        self(prompt)
    }
}

/// Single-shot, synchronous prompt completion.
pub trait TextGenerator {
    fn generate_response(&self, prompt: &str) -> Result<String, GenerationError>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> Result<String, GenerationError>,
{
    fn generate_response(&self, prompt: &str) -> Result<String, GenerationError> {
        self(prompt)
    }
}
