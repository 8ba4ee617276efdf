//! OpenAiCompatBackend - chat-completions wire shape with a configurable
//! base URL.
//!
//! OpenAI, Groq, and OpenRouter all speak this shape, as do self-hosted
//! gateways configured through the custom provider; only the endpoint and
//! the default model differ.

use crate::http::{map_http_error, map_transport_error, parse_retry_after};
use crate::structured::{VALIDATION_RETRIES, parse_structured};
use async_trait::async_trait;
use reqwest::Client;
use scriba_core::{BackendSelection, CompletionBackend, CompletionError, CompletionOutput};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Structured backend for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiCompatBackend {
    client: Client,
    api_key: String,
    base_url: String,
    selection: BackendSelection,
}

impl OpenAiCompatBackend {
    /// Creates a new backend against the given endpoint. An empty model in
    /// the selection falls back to [`DEFAULT_OPENAI_MODEL`].
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        mut selection: BackendSelection,
    ) -> Self {
        if selection.model.is_empty() {
            selection.model = DEFAULT_OPENAI_MODEL.to_string();
        }
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            selection,
        }
    }

    async fn send_request(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: self.selection.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| map_transport_error("OpenAI-compatible", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body, retry_after));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            CompletionError::Other(format!("Failed to parse chat completion response: {err}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyOutput)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatBackend {
    fn selection(&self) -> &BackendSelection {
        &self.selection
    }

    async fn complete(&self, prompt: &str) -> Result<CompletionOutput, CompletionError> {
        let mut last_err = CompletionError::EmptyOutput;
        for attempt in 0..=VALIDATION_RETRIES {
            let text = self.send_request(prompt).await?;
            match parse_structured(&text) {
                Ok(summary) => return Ok(CompletionOutput::Structured(summary)),
                Err(err) => {
                    tracing::warn!(
                        model = %self.selection.model,
                        base_url = %self.base_url,
                        attempt,
                        error = %err,
                        "chat completion output failed schema validation"
                    );
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    async fn close(&self) {}
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: String,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Backend hint requesting JSON-shaped output.
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
