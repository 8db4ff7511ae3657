//! Web search tool (placeholder).
//!
//! Answers every query with `Result for {query}` so the ReAct loop can be
//! exercised end to end without a search backend.

use async_trait::async_trait;
use lyra_core::error::ToolError;
use lyra_core::tool::{Tool, ToolArgs, ToolExecutor, ToolResult};

pub struct SearchTool;

#[async_trait]
impl ToolExecutor for SearchTool {
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let query = match args.get("query") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Ok(ToolResult::text(format!("Result for {query}")))
    }
}

impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for current information"
    }
}
