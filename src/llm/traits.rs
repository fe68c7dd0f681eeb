// Chat provider trait — the swap-ready abstraction over LLM backends.
//
// Two capabilities are needed by the moderation pipeline: free-text chat
// completion (used by the feedback race) and schema-constrained output
// (used by structured extraction). Providers are shared read-only across
// concurrent requests, so implementations must be Send + Sync.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::moderation::schema::SchemaDescriptor;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for calling an LLM backend. Implementations must be async because
/// every real provider is an HTTP API.
///
/// Neither method applies a timeout of its own; callers (the feedback race
/// and the structured extractor) enforce one around the call.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short identifier used in logs (e.g. "openai", "nvidia").
    fn name(&self) -> &str;

    /// Send a conversation and return the assistant's free-text reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Send a prompt constrained to `schema` and return the raw JSON the
    /// backend produced. The value is not yet validated against the schema.
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &SchemaDescriptor,
    ) -> Result<serde_json::Value>;
}
