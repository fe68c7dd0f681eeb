// Scripted chat providers shared by the integration tests.
//
// Every stub counts calls on entry and completions after its latency, so a
// test can tell whether a cancelled branch was ever invoked or ever finished.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use postcheck::llm::traits::{ChatMessage, ChatProvider};
use postcheck::moderation::models::{FeedbackSource, PostSubmission};
use postcheck::moderation::orchestrator::ModerationOrchestrator;
use postcheck::moderation::race::RaceSettings;
use postcheck::moderation::schema::SchemaDescriptor;

/// How a stub answers free-text calls.
#[derive(Clone)]
pub enum Behavior {
    Answer(String),
    Fail(String),
    Hang,
}

pub struct StubProvider {
    name: &'static str,
    latency: Duration,
    behavior: Behavior,
    structured: HashMap<&'static str, Value>,
    stalls_on: Option<&'static str>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl StubProvider {
    pub fn answering(name: &'static str, latency: Duration, text: &str) -> Self {
        Self::new(name, latency, Behavior::Answer(text.to_string()))
    }

    pub fn failing(name: &'static str, latency: Duration) -> Self {
        Self::new(name, latency, Behavior::Fail(format!("{name} is down")))
    }

    pub fn hanging(name: &'static str) -> Self {
        Self::new(name, Duration::ZERO, Behavior::Hang)
    }

    fn new(name: &'static str, latency: Duration, behavior: Behavior) -> Self {
        Self {
            name,
            latency,
            behavior,
            structured: HashMap::new(),
            stalls_on: None,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    /// Canned structured answer for the schema called `schema_name`.
    pub fn with_structured(mut self, schema_name: &'static str, value: Value) -> Self {
        self.structured.insert(schema_name, value);
        self
    }

    /// Never answer structured calls for the schema called `schema_name`.
    pub fn stalling_on(mut self, schema_name: &'static str) -> Self {
        self.stalls_on = Some(schema_name);
        self
    }

    /// Number of calls that reached the backend.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls that ran to completion.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        match self.behavior {
            Behavior::Hang => futures::future::pending::<()>().await,
            _ => tokio::time::sleep(self.latency).await,
        }
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Answer(text) => Ok(text.clone()),
            Behavior::Fail(msg) => anyhow::bail!("{msg}"),
            Behavior::Hang => unreachable!("hanging stub never completes"),
        }
    }

    async fn complete_structured(
        &self,
        _prompt: &str,
        schema: &SchemaDescriptor,
    ) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stalls_on == Some(schema.name) {
            futures::future::pending::<()>().await;
        }
        tokio::time::sleep(self.latency).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.structured
            .get(schema.name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no canned answer for {}", schema.name))
    }
}

/// A provider that panics on every call.
pub struct PanickingProvider;

#[async_trait]
impl ChatProvider for PanickingProvider {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
        panic!("provider bug")
    }

    async fn complete_structured(
        &self,
        _prompt: &str,
        _schema: &SchemaDescriptor,
    ) -> anyhow::Result<Value> {
        panic!("provider bug")
    }
}

pub fn clean_analysis() -> Value {
    json!({
        "ridiculous": false,
        "leaks_pii": false,
        "relevant_to_category": true
    })
}

pub fn suggestion() -> Value {
    json!({
        "new_post_title": "Got straight 9s at GCSE - happy to answer questions",
        "new_post_content": "Here are my results and what worked for me."
    })
}

/// Structured backend that answers both schemas.
pub fn structured_ok() -> StubProvider {
    StubProvider::answering("structured", Duration::ZERO, "")
        .with_structured("PostContent", clean_analysis())
        .with_structured("Suggestion", suggestion())
}

pub fn orchestrator(
    structured: Arc<StubProvider>,
    primary: Arc<StubProvider>,
    secondary: Arc<StubProvider>,
) -> ModerationOrchestrator {
    ModerationOrchestrator::new(structured, primary, secondary, RaceSettings::default())
}

pub fn submission(content: &str, title: &str, category: &str) -> PostSubmission {
    PostSubmission {
        content: Some(content.to_string()),
        title: Some(title.to_string()),
        category: Some(category.to_string()),
    }
}

pub fn gcse_post() -> PostSubmission {
    submission(
        "I got:\n\nMaths - 9\nPhysics - 9\nChemistry - 9\n\nAsk me anything xx",
        "I got 999 at GCSE, ask me anything",
        "GCSE",
    )
}

pub fn is_provider(source: FeedbackSource) -> bool {
    matches!(source, FeedbackSource::Primary | FeedbackSource::Secondary)
}
