//! Runtime assembly from configuration.
//!
//! [`RuntimeBuilder`] turns an [`AppConfig`] plus caller-supplied
//! collaborators (model client, embedding model, extra tools, an external
//! vector store) into a [`Runtime`]. Implementations are chosen by config
//! value:
//!
//! - `vector.store = "in_memory"` builds an [`InMemoryVectorStore`] when an
//!   embedding model is supplied; without one there is no vector store.
//! - `vector.store = "external"` requires a store from the caller.
//! - `agent.prompt_path` replaces the embedded ReAct template.
//!
//! The `search` tool is always registered, `knowledge_search` whenever a
//! vector store exists, then the caller's tools (which may replace them).

use lyra_config::{AppConfig, VectorStoreKind};
use lyra_core::error::{Error, Result};
use lyra_core::event::EventBus;
use lyra_core::memory::{EmbeddingModel, VectorStore};
use lyra_core::provider::LlmClient;
use lyra_core::tool::{Tool, ToolExecutor, ToolRegistry};
use lyra_memory::InMemoryVectorStore;
use std::sync::Arc;
use tracing::{debug, info};

use crate::manager::AgentManager;
use crate::mode::ModeRegistry;
use crate::prompt::{PromptStrategy, TemplatePrompt};
use crate::react::ReactMode;

/// A fully wired agent runtime.
pub struct Runtime {
    config: AppConfig,
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    modes: Arc<ModeRegistry>,
    vector_store: Option<Arc<dyn VectorStore>>,
    shared_events: Arc<EventBus>,
}

impl Runtime {
    pub fn builder(config: AppConfig) -> RuntimeBuilder {
        RuntimeBuilder::new(config)
    }

    /// A manager for one run or conversation.
    ///
    /// With `events.per_run_bus` each session gets its own bus, so
    /// subscribers only see events from runs they started. Otherwise every
    /// session shares [`Runtime::events`].
    pub fn session(&self) -> AgentManager {
        let events = if self.config.events.per_run_bus {
            Arc::new(EventBus::new())
        } else {
            Arc::clone(&self.shared_events)
        };
        AgentManager::new(
            Arc::clone(&self.modes),
            Arc::clone(&self.tools),
            Arc::clone(&self.llm),
            events,
        )
    }

    /// The bus shared by sessions when per-run buses are off.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.shared_events
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn modes(&self) -> &Arc<ModeRegistry> {
        &self.modes
    }

    pub fn vector_store(&self) -> Option<&Arc<dyn VectorStore>> {
        self.vector_store.as_ref()
    }

    /// Add a document to the knowledge store searched by `knowledge_search`.
    ///
    /// An existing document with the same id is replaced.
    pub async fn ingest(
        &self,
        id: &str,
        text: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let store = self.vector_store.as_ref().ok_or_else(|| Error::Config {
            message: "no vector store configured; supply an embedding model or a store".into(),
        })?;
        store.upsert(id, text, metadata).await?;
        debug!(id, chars = text.len(), "Document ingested");
        Ok(())
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    embedding_model: Option<Arc<dyn EmbeddingModel>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    prompt: Option<Arc<dyn PromptStrategy>>,
    extra_tools: ToolRegistry,
}

impl RuntimeBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            embedding_model: None,
            vector_store: None,
            prompt: None,
            extra_tools: ToolRegistry::new(),
        }
    }

    /// The model client every run talks to. Required.
    pub fn llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn embedding_model(mut self, model: Arc<dyn EmbeddingModel>) -> Self {
        self.embedding_model = Some(model);
        self
    }

    /// The store used when `vector.store = "external"`.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Override the prompt strategy, taking precedence over `agent.prompt_path`.
    pub fn prompt(mut self, prompt: Arc<dyn PromptStrategy>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.extra_tools.register_tool(tool);
        self
    }

    pub fn tool_fn(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        executor: Arc<dyn ToolExecutor>,
    ) -> Self {
        self.extra_tools.register(name, description, executor);
        self
    }

    pub fn build(self) -> Result<Runtime> {
        self.config.validate().map_err(|e| Error::Config {
            message: e.to_string(),
        })?;

        if !self.config.agent.enabled {
            return Err(Error::Config {
                message: "agent runtime is disabled (agent.enabled = false)".into(),
            });
        }

        let llm = self.llm.ok_or_else(|| Error::Config {
            message: "no LLM client supplied".into(),
        })?;

        let vector_store: Option<Arc<dyn VectorStore>> = match self.config.vector.store {
            VectorStoreKind::InMemory => self
                .embedding_model
                .map(|m| Arc::new(InMemoryVectorStore::new(m)) as Arc<dyn VectorStore>),
            VectorStoreKind::External => Some(self.vector_store.ok_or_else(|| Error::Config {
                message: "vector.store = \"external\" but no vector store was supplied".into(),
            })?),
        };

        let mut tools = lyra_tools::default_registry(vector_store.clone());
        for descriptor in self.extra_tools.descriptors() {
            if let Some(executor) = self.extra_tools.get(&descriptor.name) {
                tools.register(descriptor.name, descriptor.description, executor);
            }
        }

        let prompt: Arc<dyn PromptStrategy> = match (self.prompt, &self.config.agent.prompt_path) {
            (Some(prompt), _) => prompt,
            (None, Some(path)) => Arc::new(TemplatePrompt::from_file(path)?),
            (None, None) => Arc::new(TemplatePrompt::default()),
        };

        let mut modes = ModeRegistry::new();
        modes.register(Arc::new(
            ReactMode::new()
                .with_max_steps(self.config.agent.max_steps)
                .with_prompt(prompt),
        ));

        info!(
            model = llm.model_name(),
            max_steps = self.config.agent.max_steps,
            tools = ?tools.names(),
            vector_store = vector_store.is_some(),
            "Lyra runtime ready"
        );

        Ok(Runtime {
            config: self.config,
            llm,
            tools: Arc::new(tools),
            modes: Arc::new(modes),
            vector_store,
            shared_events: Arc::new(EventBus::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use async_trait::async_trait;
    use lyra_core::error::MemoryError;
    use lyra_core::message::Message;
    use lyra_tools::FnTool;
    use std::io::Write;

    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingModel for AxisEmbedder {
        async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, MemoryError> {
            Ok(if text.contains("paris") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            })
        }
    }

    fn llm(replies: &[&str]) -> Arc<ScriptedLlm> {
        Arc::new(ScriptedLlm::new(replies.iter().copied()))
    }

    #[test]
    fn llm_is_required() {
        let err = Runtime::builder(AppConfig::default()).build().err().unwrap();
        assert!(err.to_string().contains("no LLM client"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.vector.dimension = 0;
        let err = Runtime::builder(config).llm(llm(&[])).build().err().unwrap();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn disabled_runtime_does_not_build() {
        let mut config = AppConfig::default();
        config.agent.enabled = false;
        assert!(Runtime::builder(config).llm(llm(&[])).build().is_err());
    }

    #[test]
    fn search_only_without_embeddings() {
        let runtime = Runtime::builder(AppConfig::default())
            .llm(llm(&[]))
            .build()
            .unwrap();
        assert_eq!(runtime.tools().names(), vec!["search"]);
        assert!(runtime.vector_store().is_none());
        assert_eq!(runtime.modes().names(), vec!["react"]);
    }

    #[test]
    fn embeddings_enable_knowledge_search() {
        let runtime = Runtime::builder(AppConfig::default())
            .llm(llm(&[]))
            .embedding_model(Arc::new(AxisEmbedder))
            .build()
            .unwrap();
        assert_eq!(runtime.tools().names(), vec!["search", "knowledge_search"]);
        assert!(runtime.vector_store().is_some());
    }

    #[test]
    fn external_store_must_be_supplied() {
        let mut config = AppConfig::default();
        config.vector.store = VectorStoreKind::External;
        let err = Runtime::builder(config.clone())
            .llm(llm(&[]))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("external"));

        let store: Arc<dyn VectorStore> =
            Arc::new(InMemoryVectorStore::new(Arc::new(AxisEmbedder)));
        let runtime = Runtime::builder(config)
            .llm(llm(&[]))
            .vector_store(store)
            .build()
            .unwrap();
        assert!(runtime.tools().contains("knowledge_search"));
    }

    #[test]
    fn caller_tools_are_added_after_builtins() {
        let runtime = Runtime::builder(AppConfig::default())
            .llm(llm(&[]))
            .tool(FnTool::new("clock", "Tell the time", |_| async {
                Ok(lyra_core::ToolResult::text("noon"))
            }))
            .tool_fn("explode", "Always fails", Arc::new(FailingTool))
            .build()
            .unwrap();
        assert_eq!(runtime.tools().names(), vec!["search", "clock", "explode"]);
    }

    #[tokio::test]
    async fn prompt_path_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "CUSTOM {{{{user_question}}}}").unwrap();

        let mut config = AppConfig::default();
        config.agent.prompt_path = Some(file.path().to_path_buf());
        let scripted = llm(&["Final Answer: ok"]);
        let runtime = Runtime::builder(config).llm(scripted.clone()).build().unwrap();

        let manager = runtime.session();
        let agent = manager.default_agent("react").unwrap();
        manager.run_input(&agent, Message::user("why?")).await;

        assert_eq!(scripted.prompts(), vec!["CUSTOM why?".to_string()]);
    }

    #[test]
    fn missing_prompt_file_fails_build() {
        let mut config = AppConfig::default();
        config.agent.prompt_path = Some("/nonexistent/prompt.txt".into());
        assert!(Runtime::builder(config).llm(llm(&[])).build().is_err());
    }

    #[tokio::test]
    async fn sessions_have_isolated_buses() {
        let runtime = Runtime::builder(AppConfig::default())
            .llm(llm(&["Final Answer: a", "Final Answer: b"]))
            .build()
            .unwrap();

        let first = runtime.session();
        let second = runtime.session();
        let first_log = record_events(first.events());
        let second_log = record_events(second.events());

        let agent = first.default_agent("react").unwrap();
        first.run_input(&agent, Message::user("q")).await;

        assert!(!first_log.lock().unwrap().is_empty());
        assert!(second_log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn shared_bus_when_per_run_is_off() {
        let mut config = AppConfig::default();
        config.events.per_run_bus = false;
        let runtime = Runtime::builder(config)
            .llm(llm(&["Final Answer: a"]))
            .build()
            .unwrap();
        let log = record_events(runtime.events());

        let session = runtime.session();
        let agent = session.default_agent("react").unwrap();
        session.run_input(&agent, Message::user("q")).await;

        assert!(topics_of(&log).contains(&"agent.finish".to_string()));
    }

    #[tokio::test]
    async fn max_steps_comes_from_config() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 2;
        let scripted = Arc::new(ScriptedLlm::repeating("Action: nope\nInput: {}", 2));
        let runtime = Runtime::builder(config).llm(scripted.clone()).build().unwrap();

        let session = runtime.session();
        let agent = session.default_agent("react").unwrap();
        let result = session.run_input(&agent, Message::user("q")).await;

        assert!(result.is_interrupted());
        assert_eq!(scripted.call_count(), 2);
        assert_eq!(result.trace().last().unwrap().id, "timeout");
    }

    struct DownEmbedder;

    #[async_trait]
    impl EmbeddingModel for DownEmbedder {
        async fn embed(&self, _text: &str) -> std::result::Result<Vec<f32>, MemoryError> {
            Err(MemoryError::EmbeddingFailed("backend down".into()))
        }
    }

    #[tokio::test]
    async fn ingest_feeds_knowledge_search() {
        let runtime = Runtime::builder(AppConfig::default())
            .llm(llm(&[]))
            .embedding_model(Arc::new(AxisEmbedder))
            .build()
            .unwrap();
        runtime
            .ingest("doc-1", "paris is in france", serde_json::Map::new())
            .await
            .unwrap();

        let args = serde_json::json!({"query": "paris"}).as_object().cloned().unwrap();
        let result = runtime.tools().execute("knowledge_search", &args).await.unwrap();
        assert_eq!(result.output, "[1.000] paris is in france");
    }

    #[tokio::test]
    async fn ingest_without_store_is_config_error() {
        let runtime = Runtime::builder(AppConfig::default())
            .llm(llm(&[]))
            .build()
            .unwrap();
        let err = runtime
            .ingest("doc-1", "text", serde_json::Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn ingest_surfaces_embedding_failure() {
        let runtime = Runtime::builder(AppConfig::default())
            .llm(llm(&[]))
            .embedding_model(Arc::new(DownEmbedder))
            .build()
            .unwrap();
        let err = runtime
            .ingest("doc-1", "text", serde_json::Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Memory(MemoryError::EmbeddingFailed(_))));
    }
}
