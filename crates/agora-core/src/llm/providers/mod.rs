//! LLM provider implementations
//!
//! Only Gemini's `generateContent` protocol is spoken. `Custom` points the same
//! client at another base URL (a proxy, a compatible gateway, a local mock).

use std::sync::Arc;
use crate::config::{LlmConfig, LlmProvider};
use crate::errors::ConfigurationError;
use crate::llm::{GenerationSettings, LLM};
use crate::orchestrator::RunKind;

pub mod gemini;

/// Create an LLM client for one run.
///
/// The credential is passed in explicitly and captured by the client; it is
/// never looked up again while the run is in progress.
pub fn create_llm_client(
    config: &LlmConfig,
    credential: &str,
    kind: RunKind,
) -> Result<Arc<dyn LLM>, ConfigurationError> {
    let credential = credential.trim();
    if credential.is_empty() {
        return Err(ConfigurationError::MissingCredential);
    }

    let settings = generation_settings(config, kind);
    let client = match &config.provider {
        LlmProvider::Gemini => {
            gemini::GeminiClient::new(credential.to_string(), config.model.clone())
        }
        LlmProvider::Custom { base_url } => gemini::GeminiClient::with_base_url(
            credential.to_string(),
            config.model.clone(),
            base_url.clone(),
        ),
    }
    .with_settings(settings);

    Ok(Arc::new(client))
}

/// Resolve sampling settings; debates run a little hotter than trials unless
/// the configuration pins a temperature.
pub fn generation_settings(config: &LlmConfig, kind: RunKind) -> GenerationSettings {
    let params = &config.parameters;
    GenerationSettings {
        temperature: params.temperature.unwrap_or_else(|| default_temperature(kind)),
        top_k: params.top_k,
        top_p: params.top_p,
        max_output_tokens: params.max_output_tokens,
    }
}

pub fn default_temperature(kind: RunKind) -> f32 {
    match kind {
        RunKind::Debate => 0.8,
        RunKind::Trial => 0.7,
    }
}
