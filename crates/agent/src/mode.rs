//! Reasoning modes: pluggable strategies that run one agent turn.

use async_trait::async_trait;
use lyra_core::event::EventBus;
use lyra_core::memory::AgentMemory;
use lyra_core::message::Message;
use lyra_core::provider::LlmClient;
use lyra_core::tool::ToolRegistry;
use lyra_telemetry::Trace;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a mode needs for one run.
#[derive(Clone)]
pub struct ModeContext {
    /// Conversation so far; the first user message is the question
    pub messages: Vec<Message>,
    pub memory: Arc<dyn AgentMemory>,
    pub tools: Arc<ToolRegistry>,
    pub llm: Arc<dyn LlmClient>,
    /// Passed through to every model call
    pub options: serde_json::Map<String, serde_json::Value>,
    pub agent_id: String,
    /// Trace chain to extend
    pub trace: Vec<Trace>,
    /// Where lifecycle events go
    pub events: Arc<EventBus>,
}

impl ModeContext {
    pub fn new(
        messages: Vec<Message>,
        memory: Arc<dyn AgentMemory>,
        tools: Arc<ToolRegistry>,
        llm: Arc<dyn LlmClient>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            messages,
            memory,
            tools,
            llm,
            options: serde_json::Map::new(),
            agent_id: lyra_core::DEFAULT_AGENT_NAME.to_string(),
            trace: Vec::new(),
            events,
        }
    }

    pub fn with_options(mut self, options: serde_json::Map<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    pub fn with_trace(mut self, trace: Vec<Trace>) -> Self {
        self.trace = trace;
        self
    }

    /// The question being answered: content of the first user message.
    pub fn query(&self) -> &str {
        lyra_core::message::first_user_content(&self.messages).unwrap_or_default()
    }
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum ModeResult {
    FinalAnswer { text: String, trace: Vec<Trace> },
    Interrupted { trace: Vec<Trace> },
}

impl ModeResult {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::FinalAnswer { .. })
    }

    pub fn is_interrupted(&self) -> bool {
        !self.is_final()
    }

    pub fn final_answer(&self) -> Option<&str> {
        match self {
            Self::FinalAnswer { text, .. } => Some(text),
            Self::Interrupted { .. } => None,
        }
    }

    pub fn trace(&self) -> &[Trace] {
        match self {
            Self::FinalAnswer { trace, .. } | Self::Interrupted { trace } => trace,
        }
    }

    pub fn into_trace(self) -> Vec<Trace> {
        match self {
            Self::FinalAnswer { trace, .. } | Self::Interrupted { trace } => trace,
        }
    }
}

/// A reasoning strategy.
///
/// Runs never fail at the type level: every outcome, including model and
/// tool failures, is reported through [`ModeResult`] and its trace.
#[async_trait]
pub trait Mode: Send + Sync {
    /// Registry key, e.g. `react`.
    fn name(&self) -> &str;

    async fn run(&self, context: ModeContext) -> ModeResult;
}

/// Modes by name.
#[derive(Default)]
pub struct ModeRegistry {
    modes: HashMap<String, Arc<dyn Mode>>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the mode's own name, replacing any previous one.
    pub fn register(&mut self, mode: Arc<dyn Mode>) {
        self.modes.insert(mode.name().to_string(), mode);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Mode>> {
        self.modes.get(name).cloned()
    }

    /// Registered mode names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
