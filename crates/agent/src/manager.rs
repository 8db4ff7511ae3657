//! Agent manager — ties an agent's identity, mode and memory to a run.

use lyra_core::agent::AgentProfile;
use lyra_core::error::{AgentError, Result};
use lyra_core::event::{Event, EventBus, topics};
use lyra_core::memory::AgentMemory;
use lyra_core::message::Message;
use lyra_core::provider::LlmClient;
use lyra_core::tool::ToolRegistry;
use lyra_memory::SimpleAgentMemory;
use lyra_telemetry::TraceSummary;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::mode::{Mode, ModeContext, ModeRegistry, ModeResult};

const INTERRUPTED_FALLBACK: &str = "Agent run interrupted";

/// A named agent: profile, private memory, and the mode it runs in.
pub struct Agent {
    profile: AgentProfile,
    memory: Arc<dyn AgentMemory>,
    mode: Arc<dyn Mode>,
    tools: Option<Arc<ToolRegistry>>,
}

impl Agent {
    pub fn new(profile: AgentProfile, memory: Arc<dyn AgentMemory>, mode: Arc<dyn Mode>) -> Self {
        Self {
            profile,
            memory,
            mode,
            tools: None,
        }
    }

    /// Give the agent its own tools instead of the manager's.
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn id(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn memory(&self) -> &Arc<dyn AgentMemory> {
        &self.memory
    }

    pub fn mode(&self) -> &Arc<dyn Mode> {
        &self.mode
    }

    pub fn tools(&self) -> Option<&Arc<ToolRegistry>> {
        self.tools.as_ref()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.profile.name)
            .field("mode", &self.mode.name())
            .field("own_tools", &self.tools.is_some())
            .finish()
    }
}

/// Creates agents and runs them.
pub struct AgentManager {
    modes: Arc<ModeRegistry>,
    tools: Arc<ToolRegistry>,
    llm: Arc<dyn LlmClient>,
    events: Arc<EventBus>,
    agents: RwLock<HashMap<String, Arc<Agent>>>,
}

impl AgentManager {
    pub fn new(
        modes: Arc<ModeRegistry>,
        tools: Arc<ToolRegistry>,
        llm: Arc<dyn LlmClient>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            modes,
            tools,
            llm,
            events,
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// The bus this manager and its runs publish to.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Create and register an agent with fresh memory.
    ///
    /// Registration is by profile name; an existing agent with the same
    /// name is replaced.
    pub fn create_agent(&self, profile: AgentProfile) -> Result<Arc<Agent>> {
        let agent = self.new_agent(profile)?;
        Ok(self.register(agent))
    }

    /// Like [`create_agent`](Self::create_agent), with agent-scoped tools.
    pub fn create_agent_with_tools(
        &self,
        profile: AgentProfile,
        tools: Arc<ToolRegistry>,
    ) -> Result<Arc<Agent>> {
        let agent = self.new_agent(profile)?.with_tools(tools);
        Ok(self.register(agent))
    }

    /// An unregistered agent with fresh memory, running the profile's mode.
    fn new_agent(&self, profile: AgentProfile) -> Result<Agent> {
        let mode = self
            .modes
            .get(&profile.mode)
            .ok_or_else(|| AgentError::UnknownMode(profile.mode.clone()))?;
        Ok(Agent::new(profile, Arc::new(SimpleAgentMemory::new()), mode))
    }

    fn register(&self, agent: Agent) -> Arc<Agent> {
        let agent = Arc::new(agent);
        debug!(agent_id = agent.id(), mode = agent.mode.name(), "Agent registered");
        self.agents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(agent.id().to_string(), Arc::clone(&agent));
        agent
    }

    pub fn get_agent(&self, id: &str) -> Option<Arc<Agent>> {
        self.agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Create (or replace) the `default-agent` for `mode`.
    pub fn default_agent(&self, mode: &str) -> Result<Arc<Agent>> {
        self.create_agent(AgentProfile::default_for(mode))
    }

    /// Registered agent ids, sorted.
    pub fn agents(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Unregister an agent. Runs already holding it are unaffected.
    pub fn remove_agent(&self, id: &str) -> Option<Arc<Agent>> {
        self.agents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    /// Run the agent on a single message.
    pub async fn run_input(&self, agent: &Agent, input: Message) -> ModeResult {
        self.run(agent, vec![input]).await
    }

    /// Run the agent on a conversation.
    ///
    /// Never fails: the outcome, good or bad, is in the returned result.
    pub async fn run(&self, agent: &Agent, messages: Vec<Message>) -> ModeResult {
        let tools = agent
            .tools()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.tools));
        let context = ModeContext::new(
            messages,
            Arc::clone(&agent.memory),
            tools,
            Arc::clone(&self.llm),
            Arc::clone(&self.events),
        )
        .with_options(agent.profile.config.clone())
        .with_agent_id(agent.id());

        let mode = agent.mode.name().to_string();
        info!(agent_id = agent.id(), mode = %mode, "Agent run starting");

        self.events.publish(Event::new(
            topics::AGENT_START,
            serde_json::json!({
                "query": context.query(),
                "mode": mode,
                "agentId": agent.id(),
            }),
        ));

        let result = agent.mode.run(context).await;

        match &result {
            ModeResult::FinalAnswer { text, trace } => {
                let summary = TraceSummary::from_chain(trace);
                info!(agent_id = agent.id(), steps = summary.steps, "Agent run finished");
                self.events.publish(Event::new(
                    topics::AGENT_FINISH,
                    serde_json::json!({ "answer": text, "steps": summary.steps }),
                ));
            }
            ModeResult::Interrupted { trace } => {
                let message = trace
                    .last()
                    .map(|t| t.details.as_str())
                    .unwrap_or(INTERRUPTED_FALLBACK);
                info!(agent_id = agent.id(), reason = message, "Agent run interrupted");
                self.events.publish(Event::new(
                    topics::AGENT_ERROR,
                    serde_json::json!({ "message": message }),
                ));
            }
        }

        result
    }
}
