//! Remote inference contract and provider integrations.
//!
//! The schedulers talk to the model only through the `LLM` trait: a persona's
//! system prompt, the instruction for this turn and the full history go in,
//! one block of text or a `RemoteError` comes out. Adapters never retry.

pub use crate::core_types::{Role, Turn};
use crate::errors::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod providers;

#[async_trait]
pub trait LLM: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        instruction: &str,
        history: &[Turn],
    ) -> Result<String, RemoteError>;
}

/// Sampling settings sent with every request of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 1,
            top_p: 1.0,
            max_output_tokens: 1024,
        }
    }
}
