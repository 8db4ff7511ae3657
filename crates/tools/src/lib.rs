//! Built-in tool implementations for Lyra.
//!
//! - `search`: placeholder web search returning `Result for {query}`
//! - `knowledge_search`: semantic lookup over a [`VectorStore`]
//! - [`FnTool`]: wrap an async closure as a tool

pub mod fn_tool;
pub mod knowledge_search;
pub mod search;

use lyra_core::memory::VectorStore;
use lyra_core::tool::ToolRegistry;
use std::sync::Arc;

pub use fn_tool::FnTool;
pub use knowledge_search::KnowledgeSearchTool;
pub use search::SearchTool;

/// Create a registry with the built-in tools.
///
/// `knowledge_search` is only registered when a vector store is given.
pub fn default_registry(store: Option<Arc<dyn VectorStore>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_tool(SearchTool);
    if let Some(store) = store {
        registry.register_tool(KnowledgeSearchTool::new(store));
    }
    registry
}
