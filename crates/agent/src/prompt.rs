//! Prompt strategies for the reasoning loop.
//!
//! A [`PromptStrategy`] renders the loop's current state into the single
//! user message sent to the model each step. [`TemplatePrompt`] performs
//! literal placeholder substitution on a text template:
//!
//! | placeholder | value |
//! |---|---|
//! | `{{tool_descriptions}}` | one `name: description` line per tool |
//! | `{{tool_names}}` | tool names joined by `, ` |
//! | `{{user_question}}` | first user message, or `No question provided` |
//! | `{{history}}` | one `role: content` line per message |

use lyra_core::message::{Message, first_user_content};
use lyra_core::tool::ToolRegistry;
use lyra_core::{Error, Result};
use std::path::Path;

/// The ReAct template compiled into the binary.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/react-prompt.txt");

const NO_QUESTION: &str = "No question provided";

/// Renders the prompt for one reasoning step.
pub trait PromptStrategy: Send + Sync {
    fn build(&self, messages: &[Message], tools: &ToolRegistry) -> String;
}

/// Placeholder substitution over a template string.
#[derive(Debug, Clone)]
pub struct TemplatePrompt {
    template: String,
}

impl TemplatePrompt {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Read the template from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read prompt template {}: {e}", path.display()),
        })?;
        Ok(Self::new(template))
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplatePrompt {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl PromptStrategy for TemplatePrompt {
    fn build(&self, messages: &[Message], tools: &ToolRegistry) -> String {
        let descriptors = tools.descriptors();
        let tool_descriptions = descriptors
            .iter()
            .map(|d| format!("{}: {}", d.name, d.description))
            .collect::<Vec<_>>()
            .join("\n");
        let tool_names = tools.names().join(", ");
        let user_question = first_user_content(messages).unwrap_or(NO_QUESTION);
        let history: String = messages
            .iter()
            .map(|m| format!("{}: {}\n", m.role, m.content))
            .collect();

        self.template
            .replace("{{tool_descriptions}}", &tool_descriptions)
            .replace("{{tool_names}}", &tool_names)
            .replace("{{user_question}}", user_question)
            .replace("{{history}}", &history)
    }
}
