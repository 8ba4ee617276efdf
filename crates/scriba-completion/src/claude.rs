//! ClaudeBackend - direct REST implementation for the Anthropic messages
//! API.

use crate::http::{map_http_error, map_transport_error, parse_retry_after};
use crate::structured::{VALIDATION_RETRIES, parse_structured};
use async_trait::async_trait;
use reqwest::Client;
use scriba_core::{BackendSelection, CompletionBackend, CompletionError, CompletionOutput};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Structured backend that talks to the Claude HTTP API.
pub struct ClaudeBackend {
    client: Client,
    api_key: String,
    selection: BackendSelection,
}

impl ClaudeBackend {
    /// Creates a new backend with the provided API key. An empty model in
    /// the selection falls back to [`DEFAULT_CLAUDE_MODEL`].
    pub fn new(api_key: impl Into<String>, mut selection: BackendSelection) -> Self {
        if selection.model.is_empty() {
            selection.model = DEFAULT_CLAUDE_MODEL.to_string();
        }
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            selection,
        }
    }

    async fn send_request(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = CreateMessageRequest {
            model: self.selection.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| map_transport_error("Claude", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body, retry_after));
        }

        let parsed: CreateMessageResponse = response
            .json()
            .await
            .map_err(|err| CompletionError::Other(format!("Failed to parse Claude response: {err}")))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlockResponse::Text { text } => Some(text),
                ContentBlockResponse::Other => None,
            })
            .ok_or_else(|| CompletionError::EmptyOutput)
    }
}

#[async_trait]
impl CompletionBackend for ClaudeBackend {
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
                        attempt,
                        error = %err,
                        "Claude output failed schema validation"
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
struct CreateMessageRequest<'a> {
    model: String,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}
