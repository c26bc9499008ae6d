//! Configuration System
//!
//! A [`SimulationConfig`] is validated once, when it is built, and is
//! immutable afterwards. It can be assembled in code through
//! [`SimulationConfigBuilder`] or loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "simulation.toml";

/// Errors raised while building or loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid topology `{0}`, choose from star, small-world, scale-free")]
    UnknownTopology(String),
    #[error("unknown model `{0}`")]
    UnknownModel(String),
    #[error("num_agents must be greater than 1, got {0}")]
    TooFewAgents(usize),
    #[error("num_rounds must be at least 1")]
    NoRounds,
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    Temperature(f64),
    #[error("num_agents ({num_agents}) must be greater than small_world_k ({k})")]
    SmallWorldTooDense { num_agents: usize, k: usize },
    #[error("small_world_k must be greater than 1, got {0}")]
    SmallWorldKTooSmall(usize),
    #[error("for num_agents=2, small_world_k cannot be 1")]
    SmallWorldDegenerate,
    #[error("small_world_p must be between 0 and 1, got {0}")]
    RewiringProbability(f64),
    #[error("scale_free_m must be greater than 0")]
    ScaleFreeMZero,
    #[error("scale_free_m ({m}) must be smaller than num_agents ({num_agents})")]
    ScaleFreeMTooLarge { num_agents: usize, m: usize },
    #[error("opinion update frequency must be greater than 0")]
    ZeroUpdateFrequency,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Graph shape connecting the agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TopologyKind {
    #[serde(rename = "star")]
    Star,
    #[default]
    #[serde(rename = "small-world")]
    SmallWorld,
    #[serde(rename = "scale-free")]
    ScaleFree,
}

impl TopologyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyKind::Star => "star",
            TopologyKind::SmallWorld => "small-world",
            TopologyKind::ScaleFree => "scale-free",
        }
    }

    pub fn all() -> &'static [TopologyKind] {
        &[TopologyKind::Star, TopologyKind::SmallWorld, TopologyKind::ScaleFree]
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopologyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TopologyKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownTopology(s.to_string()))
    }
}

/// Which family of backend serves a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    OpenAi,
    Ollama,
}

/// LLM models the simulation knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModelType {
    #[serde(rename = "mistral:latest")]
    Mistral,
    #[default]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-3.5-turbo-16k")]
    Gpt35Turbo16k,
    #[serde(rename = "llama2:13b-chat")]
    Llama2,
    #[serde(rename = "llama2-uncensored")]
    Llama2Uncensored,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Mistral => "mistral:latest",
            ModelType::Gpt35Turbo => "gpt-3.5-turbo",
            ModelType::Gpt35Turbo16k => "gpt-3.5-turbo-16k",
            ModelType::Llama2 => "llama2:13b-chat",
            ModelType::Llama2Uncensored => "llama2-uncensored",
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            ModelType::Gpt35Turbo | ModelType::Gpt35Turbo16k => Backend::OpenAi,
            ModelType::Mistral | ModelType::Llama2 | ModelType::Llama2Uncensored => {
                Backend::Ollama
            }
        }
    }

    pub fn all() -> &'static [ModelType] {
        &[
            ModelType::Mistral,
            ModelType::Gpt35Turbo,
            ModelType::Gpt35Turbo16k,
            ModelType::Llama2,
            ModelType::Llama2Uncensored,
        ]
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelType::all()
            .iter()
            .copied()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownModel(s.to_string()))
    }
}

/// Validated topology parameters for a fixed number of agents.
///
/// Only obtainable through [`TopologySpec::new`] or
/// [`SimulationConfig::topology_spec`], so holding one means the
/// combination is realizable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologySpec {
    kind: TopologyKind,
    num_agents: usize,
    small_world_k: usize,
    small_world_p: f64,
    scale_free_m: usize,
}

impl TopologySpec {
    pub fn new(
        kind: TopologyKind,
        num_agents: usize,
        small_world_k: usize,
        small_world_p: f64,
        scale_free_m: usize,
    ) -> Result<Self, ConfigError> {
        validate_topology(kind, num_agents, small_world_k, small_world_p, scale_free_m)?;
        Ok(Self {
            kind,
            num_agents,
            small_world_k,
            small_world_p,
            scale_free_m,
        })
    }

    /// A star over `num_agents` nodes.
    pub fn star(num_agents: usize) -> Result<Self, ConfigError> {
        Self::new(
            TopologyKind::Star,
            num_agents,
            defaults::SMALL_WORLD_K,
            defaults::SMALL_WORLD_P,
            defaults::SCALE_FREE_M,
        )
    }

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    pub fn small_world_k(&self) -> usize {
        self.small_world_k
    }

    pub fn small_world_p(&self) -> f64 {
        self.small_world_p
    }

    pub fn scale_free_m(&self) -> usize {
        self.scale_free_m
    }
}

/// Checks a topology parameter combination.
///
/// Parameters belonging to other topologies are ignored, except that the
/// rewiring probability must always be a probability.
pub fn validate_topology(
    kind: TopologyKind,
    num_agents: usize,
    small_world_k: usize,
    small_world_p: f64,
    scale_free_m: usize,
) -> Result<(), ConfigError> {
    if num_agents <= 1 {
        return Err(ConfigError::TooFewAgents(num_agents));
    }
    if !(0.0..=1.0).contains(&small_world_p) {
        return Err(ConfigError::RewiringProbability(small_world_p));
    }
    if scale_free_m == 0 {
        return Err(ConfigError::ScaleFreeMZero);
    }

    match kind {
        TopologyKind::Star => {}
        TopologyKind::SmallWorld => {
            if num_agents <= small_world_k {
                return Err(ConfigError::SmallWorldTooDense {
                    num_agents,
                    k: small_world_k,
                });
            } else if small_world_k < 2 {
                return Err(ConfigError::SmallWorldKTooSmall(small_world_k));
            } else if num_agents == 2 && small_world_k == 1 {
                return Err(ConfigError::SmallWorldDegenerate);
            }
        }
        TopologyKind::ScaleFree => {
            if scale_free_m >= num_agents {
                return Err(ConfigError::ScaleFreeMTooLarge {
                    num_agents,
                    m: scale_free_m,
                });
            }
        }
    }
    Ok(())
}

/// Default values shared by the builder and the CLI.
pub mod defaults {
    pub const TEMPERATURE: f64 = 1.0;
    pub const SMALL_WORLD_K: usize = 4;
    pub const SMALL_WORLD_P: f64 = 0.3;
    pub const SCALE_FREE_M: usize = 1;
    pub const SEED: u64 = 42;
    pub const OPINION_UPDATE_FREQUENCY: u64 = 5;
}

/// Immutable simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    num_agents: usize,
    topic: String,
    num_rounds: u64,
    topology: TopologyKind,
    model_type: ModelType,
    temperature: f64,
    small_world_k: usize,
    small_world_p: f64,
    scale_free_m: usize,
    seed: u64,
    opinion_update_frequency: u64,
    with_moderator: bool,
}

impl SimulationConfig {
    /// Starts a builder with the three required fields.
    pub fn builder(
        num_agents: usize,
        topic: impl Into<String>,
        num_rounds: u64,
    ) -> SimulationConfigBuilder {
        SimulationConfigBuilder::new(num_agents, topic, num_rounds)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let builder: SimulationConfigBuilder = toml::from_str(content)?;
        builder.build()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn num_rounds(&self) -> u64 {
        self.num_rounds
    }

    pub fn topology(&self) -> TopologyKind {
        self.topology
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn small_world_k(&self) -> usize {
        self.small_world_k
    }

    pub fn small_world_p(&self) -> f64 {
        self.small_world_p
    }

    pub fn scale_free_m(&self) -> usize {
        self.scale_free_m
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn opinion_update_frequency(&self) -> u64 {
        self.opinion_update_frequency
    }

    pub fn with_moderator(&self) -> bool {
        self.with_moderator
    }

    /// The validated topology parameters of this config.
    pub fn topology_spec(&self) -> TopologySpec {
        TopologySpec {
            kind: self.topology,
            num_agents: self.num_agents,
            small_world_k: self.small_world_k,
            small_world_p: self.small_world_p,
            scale_free_m: self.scale_free_m,
        }
    }
}

/// Collects configuration fields; [`build`](Self::build) validates them.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfigBuilder {
    num_agents: usize,
    topic: String,
    num_rounds: u64,
    #[serde(default)]
    topology: TopologyKind,
    #[serde(default)]
    model_type: ModelType,
    #[serde(default = "default_temperature")]
    temperature: f64,
    #[serde(default = "default_small_world_k")]
    small_world_k: usize,
    #[serde(default = "default_small_world_p")]
    small_world_p: f64,
    #[serde(default = "default_scale_free_m")]
    scale_free_m: usize,
    #[serde(default = "default_seed")]
    seed: u64,
    #[serde(default = "default_opinion_update_frequency")]
    opinion_update_frequency: u64,
    #[serde(default = "default_with_moderator")]
    with_moderator: bool,
}

fn default_temperature() -> f64 {
    defaults::TEMPERATURE
}

fn default_small_world_k() -> usize {
    defaults::SMALL_WORLD_K
}

fn default_small_world_p() -> f64 {
    defaults::SMALL_WORLD_P
}

fn default_scale_free_m() -> usize {
    defaults::SCALE_FREE_M
}

fn default_seed() -> u64 {
    defaults::SEED
}

fn default_opinion_update_frequency() -> u64 {
    defaults::OPINION_UPDATE_FREQUENCY
}

fn default_with_moderator() -> bool {
    true
}

impl SimulationConfigBuilder {
    pub fn new(num_agents: usize, topic: impl Into<String>, num_rounds: u64) -> Self {
        Self {
            num_agents,
            topic: topic.into(),
            num_rounds,
            topology: TopologyKind::default(),
            model_type: ModelType::default(),
            temperature: defaults::TEMPERATURE,
            small_world_k: defaults::SMALL_WORLD_K,
            small_world_p: defaults::SMALL_WORLD_P,
            scale_free_m: defaults::SCALE_FREE_M,
            seed: defaults::SEED,
            opinion_update_frequency: defaults::OPINION_UPDATE_FREQUENCY,
            with_moderator: true,
        }
    }

    pub fn topology(mut self, topology: TopologyKind) -> Self {
        self.topology = topology;
        self
    }

    pub fn model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn small_world(mut self, k: usize, p: f64) -> Self {
        self.small_world_k = k;
        self.small_world_p = p;
        self
    }

    pub fn scale_free_m(mut self, m: usize) -> Self {
        self.scale_free_m = m;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn opinion_update_frequency(mut self, frequency: u64) -> Self {
        self.opinion_update_frequency = frequency;
        self
    }

    pub fn with_moderator(mut self, with_moderator: bool) -> Self {
        self.with_moderator = with_moderator;
        self
    }

    /// Validates every field and produces the immutable config.
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        if self.num_agents <= 1 {
            return Err(ConfigError::TooFewAgents(self.num_agents));
        }
        if self.num_rounds < 1 {
            return Err(ConfigError::NoRounds);
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        if self.opinion_update_frequency == 0 {
            return Err(ConfigError::ZeroUpdateFrequency);
        }
        validate_topology(
            self.topology,
            self.num_agents,
            self.small_world_k,
            self.small_world_p,
            self.scale_free_m,
        )?;

        Ok(SimulationConfig {
            num_agents: self.num_agents,
            topic: self.topic,
            num_rounds: self.num_rounds,
            topology: self.topology,
            model_type: self.model_type,
            temperature: self.temperature,
            small_world_k: self.small_world_k,
            small_world_p: self.small_world_p,
            scale_free_m: self.scale_free_m,
            seed: self.seed,
            opinion_update_frequency: self.opinion_update_frequency,
            with_moderator: self.with_moderator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world(num_agents: usize, k: usize) -> Result<SimulationConfig, ConfigError> {
        SimulationConfig::builder(num_agents, "ice-cream flavors", 10)
            .topology(TopologyKind::SmallWorld)
            .small_world(k, 0.3)
            .build()
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::builder(7, "ice-cream flavors", 10)
            .build()
            .unwrap();

        assert_eq!(config.topology(), TopologyKind::SmallWorld);
        assert_eq!(config.model_type(), ModelType::Gpt35Turbo);
        assert_eq!(config.temperature(), 1.0);
        assert_eq!(config.small_world_k(), 4);
        assert_eq!(config.scale_free_m(), 1);
        assert!(config.with_moderator());
    }

    #[test]
    fn test_too_few_agents() {
        for n in [0, 1] {
            let err = SimulationConfig::builder(n, "topic", 5)
                .topology(TopologyKind::Star)
                .build()
                .unwrap_err();
            assert!(matches!(err, ConfigError::TooFewAgents(_)));
        }
    }

    #[test]
    fn test_small_world_rejections() {
        assert!(matches!(
            small_world(4, 4),
            Err(ConfigError::SmallWorldTooDense { .. })
        ));
        assert!(matches!(
            small_world(3, 5),
            Err(ConfigError::SmallWorldTooDense { .. })
        ));
        assert!(matches!(
            small_world(5, 1),
            Err(ConfigError::SmallWorldKTooSmall(1))
        ));
        assert!(matches!(
            small_world(5, 0),
            Err(ConfigError::SmallWorldKTooSmall(0))
        ));
        assert!(small_world(2, 1).is_err());
        assert!(small_world(5, 4).is_ok());
        assert!(small_world(3, 2).is_ok());
    }

    #[test]
    fn test_small_world_k_ignored_for_other_topologies() {
        let config = SimulationConfig::builder(3, "topic", 5)
            .topology(TopologyKind::Star)
            .small_world(4, 0.3)
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_scale_free_m_bounds() {
        let zero = SimulationConfig::builder(5, "topic", 5)
            .topology(TopologyKind::ScaleFree)
            .scale_free_m(0)
            .build();
        assert!(matches!(zero, Err(ConfigError::ScaleFreeMZero)));

        let too_large = SimulationConfig::builder(5, "topic", 5)
            .topology(TopologyKind::ScaleFree)
            .scale_free_m(5)
            .build();
        assert!(matches!(too_large, Err(ConfigError::ScaleFreeMTooLarge { .. })));

        let ok = SimulationConfig::builder(5, "topic", 5)
            .topology(TopologyKind::ScaleFree)
            .scale_free_m(2)
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_temperature_range() {
        for t in [-0.1, 2.5, f64::NAN] {
            let err = SimulationConfig::builder(3, "topic", 5)
                .temperature(t)
                .topology(TopologyKind::Star)
                .build()
                .unwrap_err();
            assert!(matches!(err, ConfigError::Temperature(_)));
        }
        for t in [0.0, 0.7, 2.0] {
            assert!(SimulationConfig::builder(3, "topic", 5)
                .temperature(t)
                .topology(TopologyKind::Star)
                .build()
                .is_ok());
        }
    }

    #[test]
    fn test_rounds_topic_and_frequency() {
        assert!(matches!(
            SimulationConfig::builder(3, "topic", 0).build(),
            Err(ConfigError::NoRounds)
        ));
        assert!(matches!(
            SimulationConfig::builder(3, "   ", 5).build(),
            Err(ConfigError::EmptyTopic)
        ));
        assert!(matches!(
            SimulationConfig::builder(3, "topic", 5)
                .topology(TopologyKind::Star)
                .opinion_update_frequency(0)
                .build(),
            Err(ConfigError::ZeroUpdateFrequency)
        ));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("star".parse::<TopologyKind>().unwrap(), TopologyKind::Star);
        assert_eq!(
            "small-world".parse::<TopologyKind>().unwrap(),
            TopologyKind::SmallWorld
        );
        assert!(matches!(
            "ring".parse::<TopologyKind>(),
            Err(ConfigError::UnknownTopology(_))
        ));

        let model: ModelType = "llama2:13b-chat".parse().unwrap();
        assert_eq!(model, ModelType::Llama2);
        assert_eq!(model.backend(), Backend::Ollama);
        assert_eq!(ModelType::Gpt35Turbo16k.backend(), Backend::OpenAi);
        assert!("gpt-5".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
num_agents = 7
topic = "A discussion on ice-cream flavors"
num_rounds = 10
topology = "scale-free"
model_type = "llama2-uncensored"
temperature = 1.0
seed = 7
"#,
        )
        .unwrap();

        assert_eq!(config.num_agents(), 7);
        assert_eq!(config.topology(), TopologyKind::ScaleFree);
        assert_eq!(config.model_type(), ModelType::Llama2Uncensored);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.opinion_update_frequency(), 5);
    }

    #[test]
    fn test_from_toml_validates() {
        let err = SimulationConfig::from_toml_str(
            r#"
num_agents = 3
topic = "topic"
num_rounds = 10
topology = "small-world"
small_world_k = 4
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SmallWorldTooDense { .. }));

        let err = SimulationConfig::from_toml_str(
            r#"
num_agents = 3
topic = "topic"
num_rounds = 10
topology = "hexagonal"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_toml_round_trip_keeps_validation() {
        let config = SimulationConfig::builder(5, "topic", 3)
            .topology(TopologyKind::Star)
            .build()
            .unwrap();
        let text = config.to_toml().unwrap();
        assert_eq!(SimulationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_topology_spec_from_config() {
        let config = SimulationConfig::builder(6, "topic", 3)
            .topology(TopologyKind::SmallWorld)
            .small_world(2, 0.1)
            .build()
            .unwrap();
        let spec = config.topology_spec();
        assert_eq!(spec.kind(), TopologyKind::SmallWorld);
        assert_eq!(spec.num_agents(), 6);
        assert_eq!(spec.small_world_k(), 2);
    }
}
