//! Completion backend abstraction.
//!
//! A backend is the engine's view of one LLM provider: it takes a chunk
//! prompt and returns either a provider-validated [`SummaryResponse`] or
//! raw text that still has to go through the repair pipeline. Concrete
//! HTTP implementations live in the `scriba-completion` crate; this module
//! only defines the contract and the provider selection logic.

use crate::error::{Result, ScribaError};
use crate::summary::SummaryResponse;
use async_trait::async_trait;
use std::time::Duration;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Default model substituted when `builtin-ai` is requested without a
/// usable model identifier.
pub const BUILTIN_AI_FALLBACK_MODEL: &str = "llama3.2:latest";

/// Known completion providers, parsed from the caller-supplied identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Provider {
    Claude,
    Groq,
    #[strum(serialize = "openai")]
    OpenAi,
    #[strum(serialize = "openrouter")]
    OpenRouter,
    #[strum(serialize = "custom-openai")]
    CustomOpenAi,
    Ollama,
    /// Historical alias that remaps to [`Provider::Ollama`] at resolution
    /// time. Never reaches a backend factory.
    BuiltinAi,
}

impl Provider {
    /// Whether the provider validates its own output against the summary
    /// schema (structured capability) or returns raw text that must be
    /// repaired by the caller.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Provider::Ollama | Provider::BuiltinAi)
    }

    /// Whether the provider requires an API key to initialize.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Provider::Ollama | Provider::BuiltinAi)
    }
}

/// The effective provider and model a session will run against.
///
/// Resolution is where the `builtin-ai` alias gets remapped; the remap is
/// recorded in `substituted_from` so callers can observe that the session
/// is not running what they asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSelection {
    pub provider: Provider,
    pub model: String,
    pub substituted_from: Option<Provider>,
}

impl BackendSelection {
    /// Resolves a caller-supplied provider identifier and model name into
    /// an effective selection.
    ///
    /// # Errors
    ///
    /// Returns [`ScribaError::UnsupportedProvider`] for identifiers outside
    /// the known set. This is fatal to session start; there is no retry.
    pub fn resolve(provider_id: &str, model_id: &str) -> Result<Self> {
        let provider: Provider = provider_id
            .parse()
            .map_err(|_| ScribaError::UnsupportedProvider(provider_id.to_string()))?;

        if provider == Provider::BuiltinAi {
            // Not implemented as its own backend; falls back to Ollama.
            let model = if model_id.is_empty() || model_id == "undefined" {
                BUILTIN_AI_FALLBACK_MODEL.to_string()
            } else {
                model_id.to_string()
            };
            tracing::warn!(
                requested = %Provider::BuiltinAi,
                effective = %Provider::Ollama,
                model = %model,
                "provider 'builtin-ai' not implemented, substituting ollama"
            );
            return Ok(Self {
                provider: Provider::Ollama,
                model,
                substituted_from: Some(Provider::BuiltinAi),
            });
        }

        Ok(Self {
            provider,
            model: model_id.to_string(),
            substituted_from: None,
        })
    }
}

/// Errors surfaced by a completion backend for a single chunk.
///
/// Everything except [`CompletionError::Cancelled`] is chunk-local: the
/// flush cycle logs it and drops the chunk without touching the rolling
/// summary.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// The HTTP request failed or the provider returned a non-success
    /// status.
    #[error("Completion request failed: {message}")]
    Process {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The provider returned an empty response body.
    #[error("Backend returned empty output")]
    EmptyOutput,

    /// The provider output did not validate against the summary schema,
    /// even after the backend's internal retry budget.
    #[error("Backend output failed schema validation: {0}")]
    InvalidOutput(String),

    /// The request was cancelled, typically during process shutdown.
    #[error("Completion cancelled")]
    Cancelled,

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Result of one completion call.
///
/// Structured providers hand back an already-valid summary; raw-text
/// providers hand back whatever the model produced and the caller runs the
/// repair pipeline.
#[derive(Debug)]
pub enum CompletionOutput {
    Structured(SummaryResponse),
    Raw(String),
}

/// Polymorphic interface over heterogeneous completion providers.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// The effective selection this backend was built for.
    fn selection(&self) -> &BackendSelection;

    /// Runs one completion over the given chunk prompt.
    async fn complete(&self, prompt: &str) -> std::result::Result<CompletionOutput, CompletionError>;

    /// Releases any live resources (open client connections). Called on
    /// finalize, on initialization failure, and on process shutdown.
    async fn close(&self);
}

/// Builds a backend for a resolved selection.
///
/// Implemented by `scriba-completion`; the registry only knows this seam.
pub trait BackendFactory: Send + Sync {
    /// # Errors
    ///
    /// [`ScribaError::MissingCredential`] when the provider requires an API
    /// key and none was supplied.
    fn create(
        &self,
        selection: &BackendSelection,
        credential: Option<String>,
    ) -> Result<Box<dyn CompletionBackend>>;
}

/// Credential lookup, keyed by provider.
///
/// Explicit credentials passed to `start_session` always take precedence
/// over anything this store resolves.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_credential(&self, provider: Provider) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_providers() {
        for (id, expected) in [
            ("claude", Provider::Claude),
            ("groq", Provider::Groq),
            ("openai", Provider::OpenAi),
            ("openrouter", Provider::OpenRouter),
            ("custom-openai", Provider::CustomOpenAi),
            ("ollama", Provider::Ollama),
        ] {
            let selection = BackendSelection::resolve(id, "some-model").unwrap();
            assert_eq!(selection.provider, expected);
            assert_eq!(selection.model, "some-model");
            assert!(selection.substituted_from.is_none());
        }
    }

    #[test]
    fn resolve_unknown_provider_fails() {
        let err = BackendSelection::resolve("bard", "m").unwrap_err();
        assert!(matches!(err, ScribaError::UnsupportedProvider(id) if id == "bard"));
    }

    #[test]
    fn builtin_ai_substitutes_ollama_with_fallback_model() {
        let selection = BackendSelection::resolve("builtin-ai", "").unwrap();
        assert_eq!(selection.provider, Provider::Ollama);
        assert_eq!(selection.model, BUILTIN_AI_FALLBACK_MODEL);
        assert_eq!(selection.substituted_from, Some(Provider::BuiltinAi));

        // "undefined" comes from frontends serializing a missing value.
        let selection = BackendSelection::resolve("builtin-ai", "undefined").unwrap();
        assert_eq!(selection.model, BUILTIN_AI_FALLBACK_MODEL);
    }

    #[test]
    fn builtin_ai_keeps_explicit_model() {
        let selection = BackendSelection::resolve("builtin-ai", "qwen2.5:7b").unwrap();
        assert_eq!(selection.provider, Provider::Ollama);
        assert_eq!(selection.model, "qwen2.5:7b");
    }

    #[test]
    fn capability_flags() {
        assert!(Provider::Claude.is_structured());
        assert!(Provider::Claude.requires_credential());
        assert!(!Provider::Ollama.is_structured());
        assert!(!Provider::Ollama.requires_credential());
    }
}
