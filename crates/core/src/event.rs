//! Agent lifecycle events — synchronous topic-based pub/sub.
//!
//! The reasoning loop publishes an [`Event`] at every state transition
//! (`agent.start`, `agent.step`, `agent.tool.end`, ...). Listeners subscribe
//! to a single topic and are invoked on the publisher's task, in
//! subscription order, before `publish` returns.
//!
//! Each listener call is isolated: a panicking listener is logged and
//! skipped, and delivery continues with the next one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};
use tracing::{trace, warn};

/// The event catalog published by the reasoning loop and the agent manager.
pub mod topics {
    pub const AGENT_START: &str = "agent.start";
    pub const AGENT_STEP: &str = "agent.step";
    pub const AGENT_THOUGHT: &str = "agent.thought";
    pub const AGENT_TOOL_START: &str = "agent.tool.start";
    pub const AGENT_TOOL_END: &str = "agent.tool.end";
    pub const AGENT_FINISH: &str = "agent.finish";
    pub const AGENT_ERROR: &str = "agent.error";
    pub const AGENT_TIMEOUT: &str = "agent.timeout";

    /// Every topic above, in lifecycle order.
    pub const ALL: [&str; 8] = [
        AGENT_START,
        AGENT_STEP,
        AGENT_THOUGHT,
        AGENT_TOOL_START,
        AGENT_TOOL_END,
        AGENT_FINISH,
        AGENT_ERROR,
        AGENT_TIMEOUT,
    ];
}

/// An immutable event: a topic, when it happened, and a JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Topic string, e.g. `agent.step`.
    #[serde(rename = "type")]
    pub event_type: String,

    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    /// Create an event stamped with the current time.
    ///
    /// An object payload is used as-is; any other JSON value is stored
    /// under the `value` key.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        let payload = match payload {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".into(), other);
                map
            }
        };
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.payload.get(key)
    }
}

/// Something that reacts to published events.
///
/// Implemented for any `Fn(&Event) + Send + Sync` closure.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> EventListener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// A synchronous, in-process event bus.
///
/// A shared bus delivers every event to every subscriber regardless of which
/// run produced it; create one bus per run when isolation matters.
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<Arc<dyn EventListener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a listener for a single topic.
    pub fn subscribe(&self, topic: impl Into<String>, listener: Arc<dyn EventListener>) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.entry(topic.into()).or_default().push(listener);
    }

    /// Register the same listener for several topics.
    pub fn subscribe_all<'a>(
        &self,
        topics: impl IntoIterator<Item = &'a str>,
        listener: Arc<dyn EventListener>,
    ) {
        for topic in topics {
            self.subscribe(topic, Arc::clone(&listener));
        }
    }

    /// Number of listeners registered for `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        listeners.get(topic).map_or(0, Vec::len)
    }

    /// Deliver an event to every listener of its topic, in subscription order.
    pub fn publish(&self, event: Event) {
        // Snapshot so listeners may subscribe while being notified.
        let targets: Vec<Arc<dyn EventListener>> = {
            let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
            match listeners.get(&event.event_type) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        trace!(topic = %event.event_type, listeners = targets.len(), "Publishing event");

        for (index, listener) in targets.iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            if outcome.is_err() {
                warn!(
                    topic = %event.event_type,
                    listener = index,
                    "Event listener panicked; continuing delivery"
                );
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
