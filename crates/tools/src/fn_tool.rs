//! Closure-backed tools.

use async_trait::async_trait;
use lyra_core::error::ToolError;
use lyra_core::tool::{Tool, ToolArgs, ToolExecutor, ToolResult};
use std::future::Future;
use std::pin::Pin;

type BoxedFuture = Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send>>;
type Handler = Box<dyn Fn(ToolArgs) -> BoxedFuture + Send + Sync>;

/// A tool whose behaviour is an async closure over its arguments.
///
/// ```ignore
/// let upper = FnTool::new("upper", "Uppercase the text", |args| async move {
///     let text = args.get("text").and_then(|v| v.as_str()).unwrap_or_default();
///     Ok(ToolResult::text(text.to_uppercase()))
/// });
/// registry.register_tool(upper);
/// ```
pub struct FnTool {
    name: String,
    description: String,
    schema: serde_json::Value,
    handler: Handler,
}

impl FnTool {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema: serde_json::json!({ "type": "object" }),
            handler: Box::new(move |args| Box::pin(f(args))),
        }
    }

    /// Replace the default `{"type": "object"}` parameter schema.
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }
}

#[async_trait]
impl ToolExecutor for FnTool {
    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        (self.handler)(args.clone()).await
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.schema.clone()
    }
}

impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}
