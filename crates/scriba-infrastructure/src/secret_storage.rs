//! Secret configuration file storage.
//!
//! Provides loading of API keys from ~/.config/scriba/secret.json and
//! exposes them through the core `CredentialStore` seam.

use crate::paths::ScribaPaths;
use async_trait::async_trait;
use scriba_core::{CredentialStore, Provider};
use serde::Deserialize;
use std::path::PathBuf;

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Configuration file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine home directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Root structure of secret.json: one optional entry per hosted provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub claude: Option<ProviderSecret>,
    #[serde(default)]
    pub groq: Option<ProviderSecret>,
    #[serde(default)]
    pub openai: Option<ProviderSecret>,
    #[serde(default)]
    pub openrouter: Option<ProviderSecret>,
}

/// A single provider's credential entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Storage for the secret configuration file (secret.json).
///
/// Responsibilities:
/// - Load secret.json from ~/.config/scriba/
/// - Parse JSON into the SecretConfig model
/// - Resolve per-provider API keys for the session registry
///
/// Does NOT:
/// - Write or modify secret files (read-only)
/// - Validate API keys against the provider
/// - Handle encryption (plaintext JSON storage)
///
/// # Security Note
///
/// This storage reads plaintext JSON files. The secret.json file should
/// have appropriate file permissions (e.g., 600) to prevent unauthorized
/// access.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a new SecretStorage with the default path
    /// (~/.config/scriba/secret.json).
    pub fn new() -> Result<Self, SecretStorageError> {
        let path =
            ScribaPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a new SecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    pub async fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SecretStorageError::NotFound(self.path.clone()));
            }
            Err(err) => return Err(SecretStorageError::IoError(err)),
        };
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Returns the path to the secret file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn entry_for(config: &SecretConfig, provider: Provider) -> Option<&ProviderSecret> {
        match provider {
            Provider::Claude => config.claude.as_ref(),
            Provider::Groq => config.groq.as_ref(),
            Provider::OpenAi => config.openai.as_ref(),
            Provider::OpenRouter => config.openrouter.as_ref(),
            // Custom endpoints reuse the openai entry.
            Provider::CustomOpenAi => config.openai.as_ref(),
            Provider::Ollama | Provider::BuiltinAi => None,
        }
    }
}

#[async_trait]
impl CredentialStore for SecretStorage {
    async fn get_credential(&self, provider: Provider) -> Option<String> {
        let config = match self.load().await {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(%provider, error = %err, "no persisted credential available");
                return None;
            }
        };
        Self::entry_for(&config, provider).map(|entry| entry.api_key.clone())
    }
}
