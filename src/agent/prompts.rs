//! Prompt templates

use crate::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// Instruction given to the assistant before the conversation history.
pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a very helpful assistant that can take on various personas if asked to.\
Consider if any of the tools in [{{#each tool_names}}'{{this}}'{{#unless @last}}, {{/unless}}{{/each}}] are useful for the current context. \
If not, don't use the tools. You provide responses in markdown format.";

/// Single-pass ("stuff") summarization prompt used by the URL reader.
pub const SUMMARY_PROMPT_TEMPLATE: &str =
    "Write a concise summary of the following:\n\n\n\"{{text}}\"\n\n\nCONCISE SUMMARY:";

/// A prompt template using Handlebars syntax
pub struct PromptTemplate {
    /// Template name
    name: String,
    /// Handlebars registry
    registry: Handlebars<'static>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(name: impl Into<String>, template: &str) -> Result<Self> {
        let name = name.into();
        let mut registry = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle quotes.
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        registry.register_template_string(&name, template)?;

        Ok(PromptTemplate { name, registry })
    }

    /// Render the template with given data
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        Ok(self.registry.render(&self.name, data)?)
    }
}

#[derive(Serialize)]
struct SystemPromptData<'a> {
    tool_names: &'a [&'a str],
}

#[derive(Serialize)]
struct SummaryPromptData<'a> {
    text: &'a str,
}

/// Render the system prompt naming the tools the model may call
pub fn system_prompt(tool_names: &[&str]) -> Result<String> {
    PromptTemplate::new("system", SYSTEM_PROMPT_TEMPLATE)?.render(&SystemPromptData { tool_names })
}

/// Render the summarization prompt for a page's text
pub fn summary_prompt(text: &str) -> Result<String> {
    PromptTemplate::new("summary", SUMMARY_PROMPT_TEMPLATE)?.render(&SummaryPromptData { text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_tools() {
        let prompt = system_prompt(&["current_weather", "google_search", "url_reader"]).unwrap();
        assert!(prompt.starts_with("You are a very helpful assistant"));
        assert!(prompt.contains("['current_weather', 'google_search', 'url_reader']"));
        assert!(prompt.ends_with("You provide responses in markdown format."));
    }

    #[test]
    fn test_summary_prompt_is_not_html_escaped() {
        let prompt = summary_prompt("Tom & Jerry's <show>").unwrap();
        assert!(prompt.contains("\"Tom & Jerry's <show>\""));
        assert!(prompt.ends_with("CONCISE SUMMARY:"));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let template = PromptTemplate::new("t", "Hello {{name}}").unwrap();
        assert!(template.render(&serde_json::json!({})).is_err());
    }
}
