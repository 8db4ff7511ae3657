//! Memory traits for per-run agent records and semantic lookup.
//!
//! Two separate capabilities live here:
//! - [`AgentMemory`]: the per-run scratchpad of thoughts, actions and
//!   observations, recalled by substring match.
//! - [`VectorStore`] + [`EmbeddingModel`]: a similarity index over text,
//!   used by knowledge-search tools.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// What a memory record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Thought,
    Action,
    Observation,
    UserInput,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thought => "thought",
            Self::Action => "action",
            Self::Observation => "observation",
            Self::UserInput => "user_input",
        }
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique ID for this memory. Assigned by the store when empty.
    pub id: String,

    pub kind: MemoryKind,

    /// The content of the memory
    pub content: String,

    /// Free-form metadata (e.g. the step number that produced it)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// When this memory was created
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn new(id: impl Into<String>, kind: MemoryKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            metadata: serde_json::Map::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach a metadata field.
    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A query for recalling memories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQuery {
    /// Substring to look for, case-insensitive. Empty matches everything.
    pub text: String,

    /// Restrict to one kind of record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MemoryKind>,

    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

impl MemoryQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: None,
            limit: default_limit(),
        }
    }

    pub fn with_kind(mut self, kind: MemoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `record` satisfies this query's text and kind filters.
    pub fn matches(&self, record: &MemoryRecord) -> bool {
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        self.text.is_empty()
            || record
                .content
                .to_lowercase()
                .contains(&self.text.to_lowercase())
    }
}

/// The agent's per-run memory.
#[async_trait]
pub trait AgentMemory: Send + Sync {
    /// Store a record and return its ID.
    async fn remember(&self, record: MemoryRecord) -> Result<String, MemoryError>;

    /// Records matching the query, oldest first.
    async fn recall(&self, query: &MemoryQuery) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Every stored record, oldest first.
    async fn all(&self) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Forget everything.
    async fn clear(&self) -> Result<(), MemoryError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.all().await?.len())
    }
}

/// Turns text into a fixed-dimension vector.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;

    /// Output dimension, when known up front.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// A scored hit from [`VectorStore::similarity_search`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSearchResult {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Cosine similarity to the query
    pub score: f32,
}

/// A similarity index over text documents.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed and store `text` under `id`, replacing any previous entry.
    async fn upsert(
        &self,
        id: &str,
        text: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), MemoryError>;

    /// The `k` entries closest to `query`, best first.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<VectorSearchResult>, MemoryError>;

    /// Remove an entry. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, MemoryError>;

    async fn len(&self) -> Result<usize, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_matches_case_insensitively() {
        let record = MemoryRecord::new("thought-1", MemoryKind::Thought, "Look up PARIS");
        assert!(MemoryQuery::new("paris").matches(&record));
        assert!(!MemoryQuery::new("london").matches(&record));
    }

    #[test]
    fn query_kind_filter() {
        let record = MemoryRecord::new("action-1", MemoryKind::Action, "search: {}");
        assert!(MemoryQuery::new("").with_kind(MemoryKind::Action).matches(&record));
        assert!(!MemoryQuery::new("").with_kind(MemoryKind::Thought).matches(&record));
    }

    #[test]
    fn query_limit_defaults_on_deserialize() {
        let query: MemoryQuery = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert_eq!(query.limit, 10);
        assert!(query.kind.is_none());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&MemoryKind::UserInput).unwrap();
        assert_eq!(json, "\"user_input\"");
    }
}
