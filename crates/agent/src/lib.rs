//! The ReAct reasoning loop and the runtime that wires it up.
//!
//! An agent answers a question by alternating **Thought → Action →
//! Observation**:
//!
//! 1. **Render** the prompt from the question, the tools, and the history
//! 2. **Ask** the model for one reply
//! 3. **Parse** it: a final answer ends the run, an action names a tool
//! 4. **Act**: run the tool and append its output to the history
//!
//! The loop stops at a final answer, on a fatal error, or when the step
//! budget runs out. Every step is recorded in the trace chain and
//! announced on the event bus.
//!
//! [`Runtime`] assembles everything from configuration; [`AgentManager`]
//! runs named agents; [`ReactMode`] is the loop itself.

pub mod manager;
pub mod mode;
pub mod parser;
pub mod prompt;
pub mod react;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use manager::{Agent, AgentManager};
pub use mode::{Mode, ModeContext, ModeRegistry, ModeResult};
pub use parser::{ParsedAction, parse};
pub use prompt::{DEFAULT_TEMPLATE, PromptStrategy, TemplatePrompt};
pub use react::{DEFAULT_MAX_STEPS, REACT_MODE, ReactMode};
pub use runtime::{Runtime, RuntimeBuilder};
