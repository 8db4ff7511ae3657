//! Knowledge search tool — semantic retrieval over a vector store.
//!
//! Embeds the query, asks the store for the closest documents and renders
//! them one per line, best first.

use async_trait::async_trait;
use lyra_core::error::ToolError;
use lyra_core::memory::VectorStore;
use lyra_core::tool::{Tool, ToolArgs, ToolExecutor, ToolResult};
use std::sync::Arc;

const DEFAULT_TOP_K: u64 = 3;
const MAX_TOP_K: u64 = 10;

pub struct KnowledgeSearchTool {
    store: Arc<dyn VectorStore>,
}

impl KnowledgeSearchTool {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolExecutor for KnowledgeSearchTool {
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant knowledge"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default 3)",
                    "default": DEFAULT_TOP_K
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let top_k = args
            .get("top_k")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_TOP_K)
            .min(MAX_TOP_K) as usize;

        let hits = self
            .store
            .similarity_search(query, top_k)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        tracing::debug!(query, hits = hits.len(), "Knowledge search");

        if hits.is_empty() {
            return Ok(ToolResult::text("No relevant knowledge found"));
        }

        let output = hits
            .iter()
            .map(|h| format!("[{:.3}] {}", h.score, h.text))
            .collect::<Vec<_>>()
            .join("\n");
        let data = serde_json::to_value(&hits).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })?;

        Ok(ToolResult::with_data(output, data))
    }
}

impl Tool for KnowledgeSearchTool {
    fn name(&self) -> &str {
        "knowledge_search"
    }

    fn description(&self) -> &str {
        "Search the knowledge base for documents relevant to a query"
    }
}
