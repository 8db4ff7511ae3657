//! The LLM client trait.
//!
//! The reasoning loop sends one rendered prompt per step and only needs the
//! text that comes back. Concrete chat-completion adapters live outside
//! this workspace and implement [`LlmClient`].

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A complete response from a model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Provider-specific metadata (usage, model id, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Why generation stopped, when the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl LlmResponse {
    /// A response carrying only text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// The core LLM capability.
///
/// Implementations must be safe to share across concurrent runs.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// The model this client talks to (e.g. "gpt-4o").
    fn model_name(&self) -> &str;

    /// Send messages with per-call options and get a complete response.
    async fn chat(
        &self,
        messages: &[Message],
        options: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<LlmResponse, ProviderError>;
}
