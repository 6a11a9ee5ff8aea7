//! Configuration type definitions
//!
//! Every field carries a default so an empty (or missing) `agora.yaml` yields a
//! working setup against the public Gemini endpoint. Only the credential has
//! no default; it comes from the credential store or the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::ConfigurationError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgoraConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub credentials: CredentialConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `gemini`, or a `custom:` mapping carrying `base_url`
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub provider: LlmProvider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub parameters: ModelParameters,
}

/// LLM provider types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    /// A Gemini-compatible `generateContent` endpoint at another base URL
    Custom {
        base_url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Overrides the per-variant temperature when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause between debate turns, in milliseconds
    #[serde(default = "default_debate_delay_ms")]
    pub debate_delay_ms: u64,
    /// Pause between scripted trial calls, in milliseconds
    #[serde(default)]
    pub trial_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Location of the credential file; defaults to the user config directory
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default = "default_key_name")]
    pub key_name: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            parameters: ModelParameters::default(),
        }
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: None,
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            debate_delay_ms: default_debate_delay_ms(),
            trial_delay_ms: 0,
        }
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            key_name: default_key_name(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_model() -> String { "gemini-2.0-flash".to_string() }
fn default_top_k() -> u32 { 1 }
fn default_top_p() -> f32 { 1.0 }
fn default_max_output_tokens() -> u32 { 1024 }
fn default_debate_delay_ms() -> u64 { 5000 }
fn default_key_name() -> String { "gemini_api_key".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl AgoraConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfig(
                "LLM model cannot be empty".to_string(),
            ));
        }

        if let LlmProvider::Custom { base_url } = &self.llm.provider {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(ConfigurationError::InvalidConfig(format!(
                    "Custom provider requires an http(s) 'base_url', got '{}'",
                    base_url
                )));
            }
        }

        let params = &self.llm.parameters;
        if let Some(temperature) = params.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigurationError::InvalidConfig(format!(
                    "temperature must be between 0.0 and 2.0, got {}",
                    temperature
                )));
            }
        }
        if !(params.top_p > 0.0 && params.top_p <= 1.0) {
            return Err(ConfigurationError::InvalidConfig(format!(
                "top_p must be in (0.0, 1.0], got {}",
                params.top_p
            )));
        }
        if params.top_k == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "top_k must be greater than 0".to_string(),
            ));
        }
        if params.max_output_tokens == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if self.credentials.key_name.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfig(
                "credentials.key_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
