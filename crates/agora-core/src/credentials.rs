//! Persistent storage for the inference API key.
//!
//! Keys live in a small JSON object on disk, by default
//! `<config dir>/agora/credentials.json`. Nothing here validates the key
//! against the provider; a bad key surfaces as `RemoteError::InvalidCredential`
//! on the first call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::CredentialConfig;
use crate::errors::{AgoraError, ConfigurationError};

pub const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    key_name: String,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, key_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key_name: key_name.into(),
        }
    }

    /// Store described by the `credentials` section of the config, falling
    /// back to the platform config directory.
    pub fn from_config(config: &CredentialConfig) -> Result<Self, ConfigurationError> {
        let path = match &config.store_path {
            Some(path) => path.clone(),
            None => default_store_path()?,
        };
        Ok(Self::new(path, config.key_name.clone()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, AgoraError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(BTreeMap::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), AgoraError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Saves the key, replacing any previous one. Blank keys are rejected.
    pub async fn set(&self, value: &str) -> Result<(), AgoraError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigurationError::MissingCredential.into());
        }
        let mut entries = self.read_entries().await?;
        entries.insert(self.key_name.clone(), value.to_string());
        self.write_entries(&entries).await?;
        log::info!("Saved API key to {}", self.path.display());
        Ok(())
    }

    pub async fn get(&self) -> Result<Option<String>, AgoraError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(&self.key_name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// Removes the key. Returns whether one was stored.
    pub async fn clear(&self) -> Result<bool, AgoraError> {
        let mut entries = self.read_entries().await?;
        let removed = entries.remove(&self.key_name).is_some();
        if removed {
            self.write_entries(&entries).await?;
            log::info!("Removed API key from {}", self.path.display());
        }
        Ok(removed)
    }
}

pub fn default_store_path() -> Result<PathBuf, ConfigurationError> {
    dirs::config_dir()
        .map(|dir| dir.join("agora").join(CREDENTIALS_FILE))
        .ok_or_else(|| {
            ConfigurationError::InvalidConfig("could not determine the user config directory".to_string())
        })
}

/// Picks the credential for a run: explicit flag, then the store, then the
/// environment variable named in the config. An unreadable store only fails
/// the lookup when the environment has no key either.
pub async fn resolve_credential(
    flag: Option<&str>,
    store: &CredentialStore,
    config: &CredentialConfig,
) -> Result<String, AgoraError> {
    if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
        log::debug!("Using API key from command line");
        return Ok(key.to_string());
    }

    let store_error = match store.get().await {
        Ok(Some(key)) => {
            log::debug!("Using API key from {}", store.path().display());
            return Ok(key);
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Could not read credential store {}: {}", store.path().display(), e);
            Some(e)
        }
    };

    if let Ok(key) = std::env::var(&config.api_key_env) {
        if !key.trim().is_empty() {
            log::debug!("Using API key from ${}", config.api_key_env);
            return Ok(key.trim().to_string());
        }
    }

    Err(store_error.unwrap_or_else(|| ConfigurationError::MissingCredential.into()))
}

/// Masks all but the last four characters, for display.
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("nested").join(CREDENTIALS_FILE), "gemini_api_key")
    }

    fn config_with_env(var: &str) -> CredentialConfig {
        CredentialConfig {
            api_key_env: var.to_string(),
            ..CredentialConfig::default()
        }
    }

    #[tokio::test]
    async fn test_set_get_clear() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get().await.unwrap(), None);
        store.set("  AIzaSecret  ").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("AIzaSecret"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"gemini_api_key\": \"AIzaSecret\""));

        assert!(store.clear().await.unwrap());
        assert_eq!(store.get().await.unwrap(), None);
        assert!(!store.clear().await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.set("   ").await.unwrap_err();
        assert!(matches!(
            err,
            AgoraError::Configuration(ConfigurationError::MissingCredential)
        ));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_other_entries_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CREDENTIALS_FILE);
        std::fs::write(&path, r#"{"other": "value"}"#).unwrap();

        let store = CredentialStore::new(&path, "gemini_api_key");
        store.set("key").await.unwrap();
        store.clear().await.unwrap();

        let entries: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(entries.get("other").map(String::as_str), Some("value"));
    }

    #[tokio::test]
    #[serial]
    async fn test_resolution_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let config = config_with_env("AGORA_TEST_CREDENTIAL");
        std::env::set_var("AGORA_TEST_CREDENTIAL", "from-env");

        assert_eq!(resolve_credential(None, &store, &config).await.unwrap(), "from-env");

        store.set("from-store").await.unwrap();
        assert_eq!(resolve_credential(None, &store, &config).await.unwrap(), "from-store");
        assert_eq!(
            resolve_credential(Some("from-flag"), &store, &config).await.unwrap(),
            "from-flag"
        );
        // A blank flag is treated as absent
        assert_eq!(resolve_credential(Some(" "), &store, &config).await.unwrap(), "from-store");

        std::env::remove_var("AGORA_TEST_CREDENTIAL");
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_everywhere() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let config = config_with_env("AGORA_TEST_CREDENTIAL_UNSET");
        std::env::remove_var("AGORA_TEST_CREDENTIAL_UNSET");

        let err = resolve_credential(None, &store, &config).await.unwrap_err();
        assert!(matches!(
            err,
            AgoraError::Configuration(ConfigurationError::MissingCredential)
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_corrupt_store_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CREDENTIALS_FILE);
        std::fs::write(&path, "gemini_api_key = not json").unwrap();
        let store = CredentialStore::new(&path, "gemini_api_key");
        let config = config_with_env("AGORA_TEST_CREDENTIAL_CORRUPT");

        std::env::remove_var("AGORA_TEST_CREDENTIAL_CORRUPT");
        let err = resolve_credential(None, &store, &config).await.unwrap_err();
        assert!(matches!(err, AgoraError::Serialization(_)), "{:?}", err);

        // The environment still takes over when it has a key
        std::env::set_var("AGORA_TEST_CREDENTIAL_CORRUPT", "from-env");
        let key = resolve_credential(None, &store, &config).await;
        std::env::remove_var("AGORA_TEST_CREDENTIAL_CORRUPT");
        assert_eq!(key.unwrap(), "from-env");
    }

    #[test]
    fn test_mask_credential() {
        assert_eq!(mask_credential("AIzaSyABCD1234"), "**********1234");
        assert_eq!(mask_credential("abc"), "***");
    }
}
