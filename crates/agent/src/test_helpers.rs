//! Shared test helpers for agent tests.

use async_trait::async_trait;
use lyra_core::error::{ProviderError, ToolError};
use lyra_core::event::{Event, EventBus, EventListener, topics};
use lyra_core::message::Message;
use lyra_core::provider::{LlmClient, LlmResponse};
use lyra_core::tool::{ToolArgs, ToolExecutor, ToolResult};
use std::sync::{Arc, Mutex};

/// A mock LLM client that returns a sequence of scripted replies.
///
/// Each call to `chat` returns the next reply in the queue and records the
/// prompt it was sent. Panics if more calls are made than replies provided.
pub struct ScriptedLlm {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
    call_count: Mutex<usize>,
}

impl ScriptedLlm {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    /// Script successes and failures.
    pub fn with_results(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    /// The same reply `n` times.
    pub fn repeating(reply: &str, n: usize) -> Self {
        Self::new(std::iter::repeat_n(reply, n))
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn model_name(&self) -> &str {
        "scripted-mock"
    }

    async fn chat(
        &self,
        messages: &[Message],
        _options: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<LlmResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let replies = self.replies.lock().unwrap();

        if *count >= replies.len() {
            panic!(
                "ScriptedLlm: no more replies (call #{}, have {})",
                *count,
                replies.len()
            );
        }

        self.prompts
            .lock()
            .unwrap()
            .push(messages.iter().map(|m| m.content.clone()).collect());

        let reply = replies[*count].clone();
        *count += 1;
        reply.map(LlmResponse::text)
    }
}

/// A tool that always fails.
pub struct FailingTool;

#[async_trait]
impl ToolExecutor for FailingTool {
    async fn execute(&self, _args: &ToolArgs) -> Result<ToolResult, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "explode".into(),
            reason: "kaboom".into(),
        })
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }
}

/// Subscribe to every topic and collect what gets published.
pub fn record_events(bus: &EventBus) -> Arc<Mutex<Vec<Event>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let listener: Arc<dyn EventListener> = Arc::new(move |e: &Event| {
        sink.lock().unwrap().push(e.clone());
    });
    bus.subscribe_all(topics::ALL, listener);
    log
}

/// Topics of recorded events, in publish order.
pub fn topics_of(log: &Mutex<Vec<Event>>) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .map(|e| e.event_type.clone())
        .collect()
}
