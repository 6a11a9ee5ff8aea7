//! Configuration loader for YAML files and environment overrides

use crate::config::types::*;
use crate::errors::ConfigurationError;
use std::env;
use std::path::Path;
use tokio::fs;

/// Environment variable overriding `llm.model`
pub const MODEL_ENV: &str = "AGORA_MODEL";

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<AgoraConfig, ConfigurationError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            ConfigurationError::InvalidConfig(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Load the file when it exists, otherwise fall back to defaults. Errors
    /// while checking for the file are reported, not treated as absence.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<AgoraConfig, ConfigurationError> {
        let path = path.as_ref();
        let exists = fs::try_exists(path).await.map_err(|e| {
            ConfigurationError::InvalidConfig(format!(
                "Failed to access config file {}: {}",
                path.display(),
                e
            ))
        })?;
        if exists {
            log::info!("Loading configuration from file: {}", path.display());
            Self::from_file(path).await
        } else {
            log::info!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            let mut config = AgoraConfig::default();
            Self::resolve_environment(&mut config);
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<AgoraConfig, ConfigurationError> {
        // An empty document deserializes to unit, not to an empty mapping
        let mut config: AgoraConfig = if content.trim().is_empty() {
            AgoraConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| {
                ConfigurationError::InvalidConfig(format!("Failed to parse YAML config: {}", e))
            })?
        };

        Self::resolve_environment(&mut config);

        config.validate()?;

        Ok(config)
    }

    fn resolve_environment(config: &mut AgoraConfig) {
        if let Ok(model) = env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                log::debug!("Model overridden from {}: {}", MODEL_ENV, model);
                config.llm.model = model.trim().to_string();
            }
        }
    }
}
