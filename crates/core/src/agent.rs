//! Agent profile types.

use serde::{Deserialize, Serialize};

/// Name of the agent created on demand when a run names no agent.
pub const DEFAULT_AGENT_NAME: &str = "default-agent";

/// Identity and default options of a named agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique name, used as the agent id
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Options passed to the model on every call (temperature, ...)
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,

    /// The reasoning mode this agent runs in
    pub mode: String,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            config: serde_json::Map::new(),
            mode: mode.into(),
        }
    }

    /// The profile used when no agent is named for `mode`.
    pub fn default_for(mode: &str) -> Self {
        Self::new(DEFAULT_AGENT_NAME, mode)
            .with_description(format!("Default agent for {mode} mode"))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}
