//! Backend factory: builds the concrete backend for a resolved selection.

use crate::claude::ClaudeBackend;
use crate::ollama::{OllamaBackend, ollama_host_from_env};
use crate::openai_compat::{
    GROQ_BASE_URL, OPENAI_BASE_URL, OPENROUTER_BASE_URL, OpenAiCompatBackend,
};
use scriba_core::{
    BackendFactory, BackendSelection, CompletionBackend, Provider, Result, ScribaError,
};

/// Base URL override for the custom OpenAI-compatible provider. Falls back
/// to the OpenAI endpoint when unset.
pub const CUSTOM_OPENAI_BASE_URL_ENV: &str = "SCRIBA_CUSTOM_OPENAI_BASE_URL";

/// Builds REST backends for every supported provider.
#[derive(Debug, Default)]
pub struct HttpBackendFactory;

impl HttpBackendFactory {
    pub fn new() -> Self {
        Self
    }
}

impl BackendFactory for HttpBackendFactory {
    fn create(
        &self,
        selection: &BackendSelection,
        credential: Option<String>,
    ) -> Result<Box<dyn CompletionBackend>> {
        let api_key = || {
            credential
                .clone()
                .ok_or(ScribaError::missing_credential(selection.provider))
        };

        let backend: Box<dyn CompletionBackend> = match selection.provider {
            Provider::Claude => Box::new(ClaudeBackend::new(api_key()?, selection.clone())),
            Provider::OpenAi => Box::new(OpenAiCompatBackend::new(
                api_key()?,
                OPENAI_BASE_URL,
                selection.clone(),
            )),
            Provider::Groq => Box::new(OpenAiCompatBackend::new(
                api_key()?,
                GROQ_BASE_URL,
                selection.clone(),
            )),
            Provider::OpenRouter => Box::new(OpenAiCompatBackend::new(
                api_key()?,
                OPENROUTER_BASE_URL,
                selection.clone(),
            )),
            Provider::CustomOpenAi => {
                let base_url = std::env::var(CUSTOM_OPENAI_BASE_URL_ENV)
                    .unwrap_or_else(|_| OPENAI_BASE_URL.to_string());
                Box::new(OpenAiCompatBackend::new(
                    api_key()?,
                    base_url,
                    selection.clone(),
                ))
            }
            Provider::Ollama => Box::new(OllamaBackend::new(
                ollama_host_from_env(),
                selection.clone(),
            )),
            // Remapped by BackendSelection::resolve; never reaches here.
            Provider::BuiltinAi => {
                return Err(ScribaError::UnsupportedProvider(
                    Provider::BuiltinAi.to_string(),
                ));
            }
        };

        tracing::info!(
            provider = %selection.provider,
            model = %selection.model,
            "completion backend initialized"
        );
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_providers_require_a_credential() {
        let factory = HttpBackendFactory::new();
        for provider in ["claude", "openai", "groq", "openrouter", "custom-openai"] {
            let selection = BackendSelection::resolve(provider, "some-model").unwrap();
            let err = factory.create(&selection, None).err();
            assert!(
                err.is_some_and(|e| e.is_missing_credential()),
                "{provider} should require a key"
            );

            factory
                .create(&selection, Some("sk-test".to_string()))
                .unwrap_or_else(|_| panic!("{provider} should initialize with a key"));
        }
    }

    #[test]
    fn ollama_initializes_without_credential() {
        let factory = HttpBackendFactory::new();
        let selection = BackendSelection::resolve("ollama", "llama3.2:latest").unwrap();
        let backend = factory.create(&selection, None).unwrap();
        assert_eq!(backend.selection().model, "llama3.2:latest");
    }

    #[test]
    fn builtin_ai_resolves_before_the_factory() {
        let factory = HttpBackendFactory::new();
        let selection = BackendSelection::resolve("builtin-ai", "").unwrap();
        // Resolution already remapped to Ollama.
        let backend = factory.create(&selection, None).unwrap();
        assert_eq!(backend.selection().provider, Provider::Ollama);
    }

    #[test]
    fn empty_model_gets_provider_default() {
        let factory = HttpBackendFactory::new();
        let selection = BackendSelection::resolve("claude", "").unwrap();
        let backend = factory.create(&selection, Some("sk-test".into())).unwrap();
        assert_eq!(backend.selection().model, crate::claude::DEFAULT_CLAUDE_MODEL);
    }
}
