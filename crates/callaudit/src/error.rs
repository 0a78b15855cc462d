use std::path::PathBuf;
use thiserror::Error;

use crate::job::{JobId, JobState};

#[derive(Error, Debug)]
pub enum CallAuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulator error: {0}")]
    Simulator(#[from] SimulatorError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("Unsupported media type '{category}' for '{name}': only audio and video calls are accepted")]
    UnsupportedMediaType { name: String, category: String },

    #[error("Job {id} cannot be retried while {state}")]
    InvalidRetryState { id: JobId, state: JobState },

    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: JobId,
        from: JobState,
        to: JobState,
    },

    #[error("Job not found: {0}")]
    NotFound(JobId),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Unsupported config format for '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Failed to spawn tick driver: {0}")]
    SpawnFailed(String),

    #[error("Tick driver thread panicked")]
    Panicked,
}

pub type Result<T> = std::result::Result<T, CallAuditError>;
