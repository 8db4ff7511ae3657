//! In-process agent memory, one instance per agent.

use async_trait::async_trait;
use lyra_core::error::MemoryError;
use lyra_core::memory::{AgentMemory, MemoryQuery, MemoryRecord};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Stores records in insertion order in a Vec.
///
/// Lives as long as its agent; nothing is persisted.
pub struct SimpleAgentMemory {
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl SimpleAgentMemory {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for SimpleAgentMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentMemory for SimpleAgentMemory {
    async fn remember(&self, mut record: MemoryRecord) -> Result<String, MemoryError> {
        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        }
        let id = record.id.clone();
        self.records.write().await.push(record);
        Ok(id)
    }

    async fn recall(&self, query: &MemoryQuery) -> Result<Vec<MemoryRecord>, MemoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| query.matches(r))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self.records.read().await.clone())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.records.read().await.len())
    }
}
