//! OllamaBackend - raw-text backend against a local Ollama server.
//!
//! Ollama is prompted with a system-role message and `format: "json"` as a
//! backend hint, but its output is unvalidated: the caller must run it
//! through the repair pipeline. Unlike the hosted providers, this backend
//! holds a live client connection that must be explicitly released.

use crate::http::{map_http_error, map_transport_error};
use async_trait::async_trait;
use reqwest::Client;
use scriba_core::{BackendSelection, CompletionBackend, CompletionError, CompletionOutput};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Mutex;

pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";

/// Resolves the Ollama host from `OLLAMA_HOST`, defaulting to the local
/// server.
pub fn ollama_host_from_env() -> String {
    env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string())
}

/// Raw-text backend that talks to an Ollama server's chat endpoint.
pub struct OllamaBackend {
    /// Live connection handle; `None` once released.
    client: Mutex<Option<Client>>,
    host: String,
    selection: BackendSelection,
}

impl OllamaBackend {
    pub fn new(host: impl Into<String>, selection: BackendSelection) -> Self {
        Self {
            client: Mutex::new(Some(Client::new())),
            host: host.into(),
            selection,
        }
    }

    fn live_client(&self) -> Result<Client, CompletionError> {
        // A poisoned lock still holds a usable handle state.
        self.client
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| CompletionError::Other("Ollama client already released".to_string()))
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    fn selection(&self) -> &BackendSelection {
        &self.selection
    }

    async fn complete(&self, prompt: &str) -> Result<CompletionOutput, CompletionError> {
        let client = self.live_client()?;

        let request = ChatRequest {
            model: self.selection.model.clone(),
            messages: vec![ChatMessage {
                role: "system",
                content: prompt,
            }],
            format: "json",
            stream: false,
        };

        let response = client
            .post(format!("{}/api/chat", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|err| map_transport_error("Ollama", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Ollama error body".to_string());
            return Err(map_http_error(status, body, None));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| CompletionError::Other(format!("Failed to parse Ollama response: {err}")))?;

        let content = parsed.message.content.trim().to_string();
        if content.is_empty() {
            tracing::warn!(model = %self.selection.model, "Ollama returned an empty response");
            return Err(CompletionError::EmptyOutput);
        }

        Ok(CompletionOutput::Raw(content))
    }

    async fn close(&self) {
        let released = self
            .client
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .is_some();
        if released {
            tracing::debug!(host = %self.host, "released Ollama client connection");
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: String,
    messages: Vec<ChatMessage<'a>>,
    format: &'static str,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> BackendSelection {
        BackendSelection::resolve("ollama", "llama3.2:latest").unwrap()
    }

    #[tokio::test]
    async fn close_releases_the_client() {
        let backend = OllamaBackend::new(DEFAULT_OLLAMA_HOST, selection());
        backend.close().await;

        let err = backend.complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::Other(_)));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let backend = OllamaBackend::new(DEFAULT_OLLAMA_HOST, selection());
        backend.close().await;
        backend.close().await;
    }

    #[tokio::test]
    async fn poisoned_client_lock_still_releases() {
        let backend = std::sync::Arc::new(OllamaBackend::new(DEFAULT_OLLAMA_HOST, selection()));

        let poisoner = backend.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.client.lock().unwrap();
            panic!("poison the client lock");
        })
        .join();

        backend.close().await;
        let err = backend.complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::Other(_)));
    }
}
