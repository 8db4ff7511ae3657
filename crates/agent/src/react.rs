//! ReAct mode — Thought → Action → Observation loop.
//!
//! Each step renders the prompt, asks the model for one reply, and parses
//! it. A final answer ends the run. An action runs the named tool and
//! feeds the observation back as history for the next step.
//!
//! # Failure policy
//!
//! - Unknown tool: recorded as an error step, the loop continues.
//! - Tool error, model call error, or a model reply carrying a provider
//!   error message: the run ends as interrupted at that step.
//! - Step budget exhausted: a `timeout` trace is appended and the run ends
//!   as interrupted.
//!
//! Every step leaves exactly one entry in the trace chain.

use async_trait::async_trait;
use lyra_core::event::{Event, EventBus, topics};
use lyra_core::memory::{MemoryKind, MemoryRecord};
use lyra_core::message::Message;
use lyra_telemetry::{Trace, TraceStatus};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::mode::{Mode, ModeContext, ModeResult};
use crate::parser::{self, ParsedAction};
use crate::prompt::{PromptStrategy, TemplatePrompt};

pub const REACT_MODE: &str = "react";
pub const DEFAULT_MAX_STEPS: u32 = 5;

/// Substrings marking a reply that is really a provider error.
const LLM_ERROR_MARKERS: [&str; 3] = ["Error calling", "Too Many Requests", "429"];

pub struct ReactMode {
    max_steps: u32,
    prompt: Arc<dyn PromptStrategy>,
}

impl ReactMode {
    /// A ReAct mode with the embedded template and the default step budget.
    pub fn new() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            prompt: Arc::new(TemplatePrompt::default()),
        }
    }

    /// Set the step budget. Values below 1 are raised to 1.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn PromptStrategy>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// End the step's trace in place and report the failure.
    fn fail_step(
        &self,
        events: &EventBus,
        trace: &mut [Trace],
        slot: usize,
        message: String,
    ) {
        let started = trace[slot].clone();
        trace[slot] = started.end(TraceStatus::Error, message.clone());
        events.publish(Event::new(
            topics::AGENT_ERROR,
            serde_json::json!({ "message": message }),
        ));
    }

    async fn remember(
        context: &ModeContext,
        step: u32,
        kind: MemoryKind,
        prefix: &str,
        content: String,
    ) {
        let record = MemoryRecord::new(format!("{prefix}-{step}"), kind, content)
            .with_meta("step", serde_json::json!(step));
        if let Err(e) = context.memory.remember(record).await {
            warn!(step, kind = %kind, "Failed to write agent memory: {e}");
        }
    }
}

impl Default for ReactMode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mode for ReactMode {
    fn name(&self) -> &str {
        REACT_MODE
    }

    async fn run(&self, context: ModeContext) -> ModeResult {
        let mode = self.name();
        let events = Arc::clone(&context.events);
        let mut messages = context.messages.clone();
        let mut trace = context.trace.clone();

        info!(
            mode,
            agent_id = %context.agent_id,
            max_steps = self.max_steps,
            messages = messages.len(),
            "ReAct loop starting"
        );

        events.publish(Event::new(
            topics::AGENT_START,
            serde_json::json!({
                "query": context.query(),
                "mode": mode,
                "agentId": context.agent_id,
            }),
        ));

        for step in 0..self.max_steps {
            let slot = trace.len();
            trace.push(Trace::start(
                format!("trace-{step}"),
                step,
                mode,
                context.agent_id.as_str(),
                "reasoning",
                format!("Starting reasoning step {step}"),
            ));

            events.publish(Event::new(
                topics::AGENT_STEP,
                serde_json::json!({ "step": step + 1, "mode": mode }),
            ));

            // ── Prompt and model call ──
            let prompt = self.prompt.build(&messages, &context.tools);
            debug!(step = step + 1, prompt_len = prompt.len(), "Calling LLM");

            let output = match context
                .llm
                .chat(&[Message::user(prompt)], &context.options)
                .await
            {
                Ok(response) => response.content,
                Err(e) => {
                    let message = format!("LLM error: {e}");
                    error!(step = step + 1, "{message}");
                    self.fail_step(&events, &mut trace, slot, message);
                    return ModeResult::Interrupted { trace };
                }
            };

            if LLM_ERROR_MARKERS.iter().any(|m| output.contains(m)) {
                let message = format!("LLM API Error: {output}");
                error!(step = step + 1, "{message}");
                self.fail_step(&events, &mut trace, slot, message);
                return ModeResult::Interrupted { trace };
            }

            // ── Parse ──
            let (thought, action_name, action_input) = match parser::parse(&output) {
                ParsedAction::FinalAnswer { text, thought } => {
                    info!(step = step + 1, answer_len = text.len(), "Final answer reached");
                    if let Some(thought) = thought {
                        messages.push(Message::assistant(thought));
                    }
                    let started = trace[slot].clone();
                    trace[slot] = started.end(TraceStatus::Completed, "Final answer reached");
                    events.publish(Event::new(
                        topics::AGENT_FINISH,
                        serde_json::json!({ "answer": text, "steps": step + 1 }),
                    ));
                    return ModeResult::FinalAnswer { text, trace };
                }
                ParsedAction::NextAction {
                    thought,
                    action_name,
                    action_input,
                } => (thought, action_name, action_input),
            };

            events.publish(Event::new(
                topics::AGENT_THOUGHT,
                serde_json::json!({ "thought": thought }),
            ));

            // ── Act ──
            let Some(tool) = context.tools.get(&action_name) else {
                let message = format!("Error: Tool {action_name} not found");
                warn!(step = step + 1, tool = %action_name, "Tool not found; continuing");
                messages.push(Message::assistant(thought));
                messages.push(Message::tool(action_name.as_str(), message.as_str()));
                self.fail_step(&events, &mut trace, slot, message);
                continue;
            };

            debug!(step = step + 1, tool = %action_name, "Executing tool");
            events.publish(Event::new(
                topics::AGENT_TOOL_START,
                serde_json::json!({ "name": action_name, "input": action_input }),
            ));

            match tool.execute(&action_input).await {
                Ok(result) => {
                    let observation = result.output;
                    events.publish(Event::new(
                        topics::AGENT_TOOL_END,
                        serde_json::json!({ "name": action_name, "result": observation }),
                    ));

                    messages.push(Message::assistant(thought.as_str()));
                    messages.push(Message::tool(action_name.as_str(), observation.as_str()));

                    let input_json = serde_json::Value::Object(action_input).to_string();
                    Self::remember(&context, step, MemoryKind::Thought, "thought", thought).await;
                    Self::remember(
                        &context,
                        step,
                        MemoryKind::Action,
                        "action",
                        format!("{action_name}: {input_json}"),
                    )
                    .await;
                    Self::remember(
                        &context,
                        step,
                        MemoryKind::Observation,
                        "observation",
                        observation,
                    )
                    .await;

                    let started = trace[slot].clone();
                    trace[slot] =
                        started.end(TraceStatus::Completed, format!("Tool {action_name} executed"));
                }
                Err(e) => {
                    let message = format!("Tool execution error: {e}");
                    error!(step = step + 1, tool = %action_name, "{message}");
                    messages.push(Message::assistant(thought));
                    messages.push(Message::tool(action_name.as_str(), message.as_str()));
                    self.fail_step(&events, &mut trace, slot, message);
                    return ModeResult::Interrupted { trace };
                }
            }
        }

        warn!(max_steps = self.max_steps, "Max steps reached without a final answer");
        trace.push(
            Trace::start(
                "timeout",
                self.max_steps,
                mode,
                context.agent_id.as_str(),
                "timeout",
                format!(
                    "Agent failed to reach a final answer within {} steps",
                    self.max_steps
                ),
            )
            .end(TraceStatus::Interrupted, "Max steps reached"),
        );
        events.publish(Event::new(
            topics::AGENT_TIMEOUT,
            serde_json::json!({ "maxSteps": self.max_steps }),
        ));
        ModeResult::Interrupted { trace }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use lyra_core::error::ProviderError;
    use lyra_core::memory::{AgentMemory, MemoryQuery};
    use lyra_core::tool::ToolRegistry;
    use lyra_memory::SimpleAgentMemory;
    use lyra_tools::SearchTool;

    const SEARCH_STEP: &str =
        "Thought: need capital.\nAction: search\nInput: {\"query\": \"capital of France\"}";
    const FINAL: &str = "Final Answer: The capital of France is Paris.";

    struct Harness {
        llm: Arc<ScriptedLlm>,
        memory: Arc<SimpleAgentMemory>,
        events: Arc<EventBus>,
        tools: Arc<ToolRegistry>,
    }

    impl Harness {
        fn new(llm: ScriptedLlm) -> Self {
            let mut tools = ToolRegistry::new();
            tools.register_tool(SearchTool);
            tools.register("explode", "Always fails", Arc::new(FailingTool));
            Self {
                llm: Arc::new(llm),
                memory: Arc::new(SimpleAgentMemory::new()),
                events: Arc::new(EventBus::new()),
                tools: Arc::new(tools),
            }
        }

        fn context(&self, question: &str) -> ModeContext {
            ModeContext::new(
                vec![Message::user(question)],
                self.memory.clone(),
                self.tools.clone(),
                self.llm.clone(),
                self.events.clone(),
            )
        }
    }

    #[tokio::test]
    async fn single_final_answer() {
        let h = Harness::new(ScriptedLlm::new(["Final Answer: 42"]));
        let result = ReactMode::new().run(h.context("meaning?")).await;

        assert!(result.is_final());
        assert_eq!(result.final_answer(), Some("42"));
        assert_eq!(h.llm.call_count(), 1);
        assert_eq!(result.trace().len(), 1);
        assert_eq!(result.trace()[0].status, TraceStatus::Completed);
        assert_eq!(result.trace()[0].details, "Final answer reached");
    }

    #[tokio::test]
    async fn tool_step_then_answer() {
        let h = Harness::new(ScriptedLlm::new([SEARCH_STEP, FINAL]));
        let result = ReactMode::new()
            .run(h.context("What is the capital of France?"))
            .await;

        assert_eq!(result.final_answer(), Some("The capital of France is Paris."));
        assert_eq!(h.llm.call_count(), 2);

        let trace = result.trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].id, "trace-0");
        assert_eq!(trace[0].status, TraceStatus::Completed);
        assert_eq!(trace[0].details, "Tool search executed");
        assert_eq!(trace[1].id, "trace-1");
        assert_eq!(trace[1].step, 1);

        // Second prompt carries the observation.
        let prompts = h.llm.prompts();
        assert!(prompts[1].contains("tool: Result for capital of France"));
        assert!(prompts[1].contains("assistant: need capital."));
    }

    #[tokio::test]
    async fn tool_step_is_remembered() {
        let h = Harness::new(ScriptedLlm::new([SEARCH_STEP, FINAL]));
        ReactMode::new().run(h.context("q")).await;

        let records = h.memory.all().await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["thought-0", "action-0", "observation-0"]);
        assert_eq!(records[0].content, "need capital.");
        assert_eq!(records[1].content, r#"search: {"query":"capital of France"}"#);
        assert_eq!(records[2].content, "Result for capital of France");
        assert_eq!(records[2].metadata["step"], 0);

        let actions = h
            .memory
            .recall(&MemoryQuery::new("search").with_kind(MemoryKind::Action))
            .await
            .unwrap();
        assert_eq!(actions.len(), 1);
    }

    #[tokio::test]
    async fn missing_tool_continues() {
        let h = Harness::new(ScriptedLlm::new([
            "Thought: try it\nAction: teleport\nInput: {}",
            FINAL,
        ]));
        let log = record_events(&h.events);
        let result = ReactMode::new().run(h.context("q")).await;

        assert!(result.is_final());
        assert_eq!(h.llm.call_count(), 2);
        assert_eq!(result.trace()[0].status, TraceStatus::Error);
        assert_eq!(result.trace()[0].details, "Error: Tool teleport not found");
        assert!(h.llm.prompts()[1].contains("tool: Error: Tool teleport not found"));
        assert!(topics_of(&log).contains(&"agent.error".to_string()));
        assert_eq!(h.memory.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn tool_error_interrupts() {
        let h = Harness::new(ScriptedLlm::new([
            "Action: explode\nInput: {}",
            FINAL,
        ]));
        let log = record_events(&h.events);
        let result = ReactMode::new().run(h.context("q")).await;

        assert!(result.is_interrupted());
        assert_eq!(h.llm.call_count(), 1);
        let last = result.trace().last().unwrap();
        assert_eq!(last.status, TraceStatus::Error);
        assert!(last.details.starts_with("Tool execution error:"));
        assert!(last.details.contains("kaboom"));
        assert_eq!(topics_of(&log).last().map(String::as_str), Some("agent.error"));
    }

    #[tokio::test]
    async fn llm_call_error_interrupts() {
        let h = Harness::new(ScriptedLlm::with_results(vec![Err(ProviderError::Network(
            "connection reset".into(),
        ))]));
        let result = ReactMode::new().run(h.context("q")).await;

        assert!(result.is_interrupted());
        let last = result.trace().last().unwrap();
        assert!(last.details.starts_with("LLM error:"));
        assert!(last.details.contains("connection reset"));
    }

    #[tokio::test]
    async fn error_text_in_reply_interrupts() {
        for reply in [
            "Error calling model endpoint",
            "HTTP 429",
            "Too Many Requests, slow down",
        ] {
            let h = Harness::new(ScriptedLlm::new([reply]));
            let result = ReactMode::new().run(h.context("q")).await;
            assert!(result.is_interrupted(), "{reply}");
            assert_eq!(
                result.trace()[0].details,
                format!("LLM API Error: {reply}")
            );
        }
    }

    #[tokio::test]
    async fn budget_exhaustion_times_out() {
        let h = Harness::new(ScriptedLlm::repeating("Action: nowhere\nInput: {}", 3));
        let log = record_events(&h.events);
        let result = ReactMode::new().with_max_steps(3).run(h.context("q")).await;

        assert!(result.is_interrupted());
        assert_eq!(h.llm.call_count(), 3);

        let trace = result.trace();
        assert_eq!(trace.len(), 4);
        let timeout = &trace[3];
        assert_eq!(timeout.id, "timeout");
        assert_eq!(timeout.step, 3);
        assert_eq!(timeout.action, "timeout");
        assert_eq!(timeout.status, TraceStatus::Interrupted);
        assert_eq!(timeout.details, "Max steps reached");

        let events = log.lock().unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.event_type, "agent.timeout");
        assert_eq!(last.get("maxSteps"), Some(&serde_json::json!(3)));
    }

    #[tokio::test]
    async fn empty_reply_is_unknown_tool() {
        let h = Harness::new(ScriptedLlm::new(["", FINAL]));
        let result = ReactMode::new().run(h.context("q")).await;
        assert!(result.is_final());
        assert_eq!(result.trace()[0].details, "Error: Tool unknown not found");
    }

    #[tokio::test]
    async fn step_events_are_one_based() {
        let h = Harness::new(ScriptedLlm::new([SEARCH_STEP, FINAL]));
        let log = record_events(&h.events);
        ReactMode::new().run(h.context("q")).await;

        let events = log.lock().unwrap();
        let steps: Vec<_> = events
            .iter()
            .filter(|e| e.event_type == topics::AGENT_STEP)
            .filter_map(|e| e.get("step").cloned())
            .collect();
        assert_eq!(steps, vec![serde_json::json!(1), serde_json::json!(2)]);

        let finish = events.last().unwrap();
        assert_eq!(finish.event_type, topics::AGENT_FINISH);
        assert_eq!(finish.get("steps"), Some(&serde_json::json!(2)));
    }

    #[tokio::test]
    async fn existing_trace_is_extended() {
        let h = Harness::new(ScriptedLlm::new(["Final Answer: ok"]));
        let earlier = Trace::start("earlier", 0, "react", "a", "reasoning", "x")
            .end(TraceStatus::Completed, "done");
        let result = ReactMode::new()
            .run(h.context("q").with_trace(vec![earlier]))
            .await;

        let trace = result.trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].id, "earlier");
        assert_eq!(trace[1].id, "trace-0");
    }

    #[tokio::test]
    async fn zero_budget_is_raised_to_one() {
        assert_eq!(ReactMode::new().with_max_steps(0).max_steps(), 1);
    }
}
