//! Tools module - the capabilities the model can call
//!
//! Each tool is a self-contained module that implements the `Tool` trait.
//! Tools are registered into a `ToolRegistry` and made available to the LLM
//! for function calling.
//!
//! ## Built-in Tools
//!
//! - **current_weather**: OpenWeatherMap current conditions
//! - **google_search**: Google Custom Search, top 5 results
//! - **url_reader**: fetch a page and summarize it with the chat model

mod google_search;
mod registry;
mod traits;
mod url_reader;
mod weather;

use std::sync::Arc;

use crate::agent::{ChatModel, GenerationOptions};
use crate::config::Config;
use crate::error::Result;

// Core trait and types
pub use traits::{parse_arguments, Tool, ToolCall, ToolResult};

// Registry
pub use registry::ToolRegistry;

// Built-in tools
pub use google_search::{GoogleSearchTool, SearchResult, NO_RESULTS_MESSAGE};
pub use url_reader::{extract_text, UrlReaderTool};
pub use weather::{error_envelope, CurrentWeatherTool, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

/// Build the registry with the weather, search and URL reader tools.
///
/// `model` is the chat model the URL reader summarizes with, sampled with
/// `summary_options`.
pub fn builtin_registry(
    config: &Config,
    model: Arc<dyn ChatModel>,
    summary_options: GenerationOptions,
) -> Result<ToolRegistry> {
    let tools = &config.tools;
    let mut registry = ToolRegistry::new();

    registry.register(CurrentWeatherTool::new(
        tools.weather.clone(),
        tools.timeout_secs,
    )?);
    registry.register(GoogleSearchTool::new(
        tools.search.clone(),
        tools.timeout_secs,
    )?);
    registry.register(UrlReaderTool::new(
        model,
        summary_options,
        tools.timeout_secs,
        tools.reader_max_chars,
    )?);

    Ok(registry)
}
