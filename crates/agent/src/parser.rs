//! ReAct output parser.
//!
//! Turns the model's free-text reply into a [`ParsedAction`]. Parsing is
//! total: every input maps to exactly one variant and nothing errors.
//!
//! Priority, on the trimmed text:
//! 1. `Final Answer:` anywhere wins; the rest of the text is the answer.
//!    Only a `Thought:`-labelled prefix is kept as its thought.
//! 2. `Action:` followed later by `Input:` is a tool call. The input must be
//!    a JSON object; anything else becomes an empty map.
//! 3. Any other non-empty text is taken as a final answer.
//! 4. Empty text is a call to the `unknown` tool.

use serde_json::{Map, Value};
use tracing::debug;

const FINAL_ANSWER: &str = "Final Answer:";
const ACTION: &str = "Action:";
const INPUT: &str = "Input:";
const THOUGHT: &str = "Thought:";

/// Action name produced for an empty reply.
pub const UNKNOWN_ACTION: &str = "unknown";

/// What the model asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedAction {
    /// The run is over.
    FinalAnswer {
        text: String,
        thought: Option<String>,
    },
    /// Call a tool and continue.
    NextAction {
        thought: String,
        action_name: String,
        action_input: Map<String, Value>,
    },
}

impl ParsedAction {
    pub fn is_final_answer(&self) -> bool {
        matches!(self, Self::FinalAnswer { .. })
    }

    /// The reasoning preceding the answer or action, if any.
    pub fn thought(&self) -> Option<&str> {
        match self {
            Self::FinalAnswer { thought, .. } => thought.as_deref(),
            Self::NextAction { thought, .. } => Some(thought.as_str()),
        }
    }
}

/// Parse one model reply.
pub fn parse(output: &str) -> ParsedAction {
    let text = output.trim();

    if let Some(pos) = text.find(FINAL_ANSWER) {
        let answer = text[pos + FINAL_ANSWER.len()..].trim();
        return ParsedAction::FinalAnswer {
            text: answer.to_string(),
            thought: labelled_thought(&text[..pos]).map(str::to_string),
        };
    }

    if let Some(action_pos) = text.find(ACTION) {
        let name_start = action_pos + ACTION.len();
        if let Some(rel) = text[name_start..].find(INPUT) {
            let input_start = name_start + rel;
            let action_name = text[name_start..input_start].trim();
            let raw_input = text[input_start + INPUT.len()..].trim();
            return ParsedAction::NextAction {
                thought: strip_thought(&text[..action_pos]).to_string(),
                action_name: action_name.to_string(),
                action_input: parse_input(raw_input),
            };
        }
    }

    if !text.is_empty() {
        return ParsedAction::FinalAnswer {
            text: text.to_string(),
            thought: None,
        };
    }

    ParsedAction::NextAction {
        thought: String::new(),
        action_name: UNKNOWN_ACTION.to_string(),
        action_input: Map::new(),
    }
}

/// The `Thought:` block of a final-answer prefix, up to any `Action:` marker.
fn labelled_thought(prefix: &str) -> Option<&str> {
    let body = prefix.trim().strip_prefix(THOUGHT)?;
    let body = body.find(ACTION).map_or(body, |end| &body[..end]).trim();
    (!body.is_empty()).then_some(body)
}

fn strip_thought(prefix: &str) -> &str {
    let prefix = prefix.trim();
    prefix.strip_prefix(THOUGHT).unwrap_or(prefix).trim()
}

fn parse_input(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!(input = %other, "Action input is not a JSON object; using empty input");
            Map::new()
        }
        Err(e) => {
            debug!(error = %e, "Action input is not valid JSON; using empty input");
            Map::new()
        }
    }
}
