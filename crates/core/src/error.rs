//! Error types shared by the Lyra crates.
//!
//! Each collaborator boundary (model calls, tools, memory, agent lookup)
//! has its own `thiserror` enum. Model and tool failures never leave the
//! reasoning loop; they end up in the trace. [`Error`] covers the paths
//! that return [`Result`]: building a runtime, creating agents and feeding
//! the knowledge store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("memory failure: {0}")]
    Memory(#[from] MemoryError),

    #[error("agent failure: {0}")]
    Agent(#[from] AgentError),

    /// Invalid or unusable configuration, including missing collaborators.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Boundary errors ───────────────────────────────────────────────────────

/// Failures reported by an [`LlmClient`](crate::provider::LlmClient).
/// The reasoning loop treats every one of them as fatal to the run.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("transport: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("no tool named {0}")]
    NotFound(String),

    #[error("{tool_name} failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("bad arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("store: {0}")]
    Storage(String),

    #[error("embedding: {0}")]
    EmbeddingFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// No mode is registered under the requested name.
    #[error("no mode named {0}")]
    UnknownMode(String),
}
