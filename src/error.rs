use crate::types::AgentId;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum EvolutionError {
    #[error("Insufficient population: {survivors} survivor(s), breeding degraded to self-crossover")]
    InsufficientPopulation { survivors: usize },

    #[error("Parent not found: {0}")]
    ParentNotFound(AgentId),

    #[error("Invalid value for parameter {param}: {value}")]
    InvalidParameterValue { param: String, value: f64 },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Evolution cycle invoked on an empty population")]
    EmptyPopulation,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EvolutionError {
    fn from(err: serde_json::Error) -> Self {
        EvolutionError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for EvolutionError {
    fn from(err: config::ConfigError) -> Self {
        EvolutionError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvolutionError>;
