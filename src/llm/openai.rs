// OpenAI-compatible chat completions client.
//
// Both hosted backends (OpenAI and NVIDIA's integrate API) speak the same
// `/chat/completions` wire format, so one client covers them. Structured
// output uses forced function calling: the schema is offered as the only
// tool and the model must call it, so the tool-call arguments are the
// schema instance.
//
// No request timeout is configured here. The feedback race bounds the
// free-text calls and the structured extractor bounds schema calls.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::traits::{ChatMessage, ChatProvider};
use crate::config::ProviderConfig;
use crate::moderation::schema::SchemaDescriptor;

/// Chat client for one OpenAI-compatible backend.
pub struct OpenAiCompatibleClient {
    name: String,
    client: Client,
    config: ProviderConfig,
}

impl OpenAiCompatibleClient {
    /// Create a client for the backend described by `config`.
    pub fn new(name: impl Into<String>, config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("postcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            name: name.into(),
            client,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<CompletionResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to call {} chat completions", self.name))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {}: {}", self.name, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", self.name))
    }

    fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            tools: None,
            tool_choice: None,
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self.send(&self.request(messages)).await?;
        let message = first_message(response)?;

        let text = message.content.unwrap_or_default();
        debug!(
            provider = %self.name,
            chars = text.chars().count(),
            "Chat completion received"
        );
        Ok(text)
    }

    async fn complete_structured(&self, prompt: &str, schema: &SchemaDescriptor) -> Result<Value> {
        let messages = [ChatMessage::user(prompt)];
        let mut request = self.request(&messages);
        request.tools = Some(vec![json!({
            "type": "function",
            "function": {
                "name": schema.name,
                "description": schema.description,
                "parameters": schema.to_json_schema(),
            }
        })]);
        request.tool_choice = Some(json!({
            "type": "function",
            "function": { "name": schema.name }
        }));

        let response = self.send(&request).await?;
        let message = first_message(response)?;

        if let Some(call) = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .find(|c| c.function.name == schema.name)
        {
            return Ok(call.function.arguments);
        }

        // Some models ignore tool_choice and answer with JSON in the content.
        match message.content {
            Some(content) if !content.trim().is_empty() => Ok(Value::String(content)),
            _ => anyhow::bail!("{} did not call the `{}` tool", self.name, schema.name),
        }
    }
}

fn first_message(response: CompletionResponse) -> Result<ResponseMessage> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .context("Completion response contained no choices")
}

// --- Chat completions request/response types ---

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    /// Usually a JSON-encoded string; a few backends send an object.
    arguments: Value,
}
