//! # Lyra Core
//!
//! Domain types, traits, and error definitions for the Lyra ReAct agent
//! runtime. It defines the model every other crate implements against.
//!
//! ## Seams
//!
//! The reasoning loop only ever talks to its collaborators through the
//! traits defined here:
//! - [`LlmClient`] for model calls
//! - [`ToolExecutor`] / [`ToolRegistry`] for actions
//! - [`AgentMemory`] for per-agent records
//! - [`EmbeddingModel`] / [`VectorStore`] for semantic lookup
//! - [`EventBus`] for lifecycle notifications

pub mod agent;
pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentProfile, DEFAULT_AGENT_NAME};
pub use error::{AgentError, Error, MemoryError, ProviderError, Result, ToolError};
pub use event::{Event, EventBus, EventListener, topics};
pub use memory::{
    AgentMemory, EmbeddingModel, MemoryKind, MemoryQuery, MemoryRecord, VectorSearchResult,
    VectorStore,
};
pub use message::{Message, Role};
pub use provider::{LlmClient, LlmResponse};
pub use tool::{Tool, ToolArgs, ToolDescriptor, ToolExecutor, ToolRegistry, ToolResult};
