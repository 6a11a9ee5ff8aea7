//! Error types for session setup, remote inference and the surrounding plumbing
//!
//! Failures are split by where they originate. `ConfigurationError` covers
//! everything that is rejected before a run starts, so it never leaves partial
//! state behind. `RemoteError` is the closed set of outcomes the inference
//! adapter may report; the schedulers only ever see these variants and never
//! inspect provider payloads. `AgoraError` unifies both for loaders and binaries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("A debate needs at least 2 agents, got {0}")]
    TooFewAgents(usize),
    #[error("Personality for agent {} is empty", .0 + 1)]
    EmptyPersonality(usize),
    #[error("Debate topic is empty")]
    EmptyTopic,
    #[error("Iteration count must be at least 1")]
    ZeroIterations,
    #[error("Case facts are empty")]
    EmptyCaseFacts,
    #[error("No API credential found. Save one with `agora token set` or set the environment variable")]
    MissingCredential,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum RemoteError {
    #[error("API key is invalid or malformed. Check your token")]
    InvalidCredential,
    #[error("Rate limit exceeded by the inference provider")]
    RateLimited,
    #[error("Incomplete or empty response from the inference provider")]
    EmptyResponse,
    #[error("Inference provider error: {0}")]
    Upstream(String),
}

#[derive(Error, Debug)]
pub enum AgoraError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AgoraError {
    fn from(err: serde_json::Error) -> Self {
        AgoraError::Serialization(err.to_string())
    }
}
