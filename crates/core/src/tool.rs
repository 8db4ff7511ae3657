//! Tool traits — the abstraction over agent capabilities.
//!
//! A tool is registered explicitly under a name and description together
//! with a [`ToolExecutor`] that does the work. The reasoning loop resolves
//! the model's `Action:` name against the [`ToolRegistry`] and executes the
//! matching capability with the parsed `Input:` map.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Arguments passed to a tool: the JSON object the model wrote after `Input:`.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The textual observation fed back to the model
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// A plain-text result.
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            data: None,
        }
    }

    /// A result with structured data alongside its text rendering.
    pub fn with_data(output: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            output: output.into(),
            data: Some(data),
        }
    }
}

impl std::fmt::Display for ToolResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.output)
    }
}

/// The executable half of a tool.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute with the given arguments.
    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError>;

    /// JSON-Schema-like description of the accepted parameters.
    fn parameters_schema(&self) -> serde_json::Value;
}

/// A self-describing tool: an executor that also knows its name and description.
///
/// Built-in tools implement this; [`ToolRegistry::register_tool`] unpacks it.
pub trait Tool: ToolExecutor {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
}

/// Name and description of a registered tool, as rendered into prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    executor: Arc<dyn ToolExecutor>,
}

/// A registry of available tools, kept in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under `name`. Replaces any existing tool with the
    /// same name, keeping its position.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        executor: Arc<dyn ToolExecutor>,
    ) {
        let descriptor = ToolDescriptor {
            name: name.into(),
            description: description.into(),
        };
        let entry = RegisteredTool {
            descriptor,
            executor,
        };
        match self.index.get(&entry.descriptor.name) {
            Some(&pos) => self.tools[pos] = entry,
            None => {
                self.index
                    .insert(entry.descriptor.name.clone(), self.tools.len());
                self.tools.push(entry);
            }
        }
    }

    /// Register a self-describing tool.
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        let description = tool.description().to_string();
        self.register(name, description, Arc::new(tool));
    }

    /// Get a tool's executor by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.index
            .get(name)
            .map(|&pos| Arc::clone(&self.tools[pos].executor))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.descriptor.name.as_str())
            .collect()
    }

    /// Look up and execute a tool.
    pub async fn execute(&self, name: &str, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let executor = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        executor.execute(args).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl ToolExecutor for EchoTool {
        async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
            let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
            Ok(ToolResult::text(text))
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
    }

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
    }

    fn args(value: serde_json::Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(EchoTool);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn descriptors_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register("zeta", "last letter", Arc::new(EchoTool));
        registry.register("alpha", "first letter", Arc::new(EchoTool));
        assert_eq!(registry.names(), vec!["zeta", "alpha"]);
        assert_eq!(registry.descriptors()[1].description, "first letter");
    }

    #[test]
    fn re_registering_replaces_in_place() {
        let mut registry = ToolRegistry::new();
        registry.register("a", "old", Arc::new(EchoTool));
        registry.register("b", "other", Arc::new(EchoTool));
        registry.register("a", "new", Arc::new(EchoTool));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.descriptors()[0].description, "new");
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(EchoTool);
        let result = registry
            .execute("echo", &args(serde_json::json!({"text": "hello world"})))
            .await
            .unwrap();
        assert_eq!(result.output, "hello world");
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("nonexistent", &ToolArgs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }
}
