//! scriba-completion - concrete completion backends over HTTP.
//!
//! Implements the `scriba-core` backend contract for Anthropic Claude,
//! OpenAI-compatible endpoints (OpenAI, Groq, OpenRouter, custom
//! gateways), and Ollama, plus the factory the session registry uses to
//! build them.

pub mod claude;
pub mod factory;
mod http;
pub mod ollama;
pub mod openai_compat;
mod structured;

pub use claude::ClaudeBackend;
pub use factory::HttpBackendFactory;
pub use ollama::OllamaBackend;
pub use openai_compat::OpenAiCompatBackend;
