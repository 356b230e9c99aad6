//! Agent module - LLM client, prompts, tool-calling loop and chat memory
//!
//! This module handles all AI-related functionality including:
//! - OpenAI chat-completions client behind the `ChatModel` seam
//! - Prompt templates
//! - The tool-calling executor
//! - Per-session conversation history
//! - The retrying, history-aware `ChatAgent` the front ends call

mod chat_agent;
mod client;
mod conversation;
mod executor;
pub mod prompts;
mod retry;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use chat_agent::ChatAgent;
pub use client::{ChatModel, OpenAIClient};
pub use conversation::{Conversation, HistoryEntry, SessionStore};
pub use executor::{
    AgentExecutor, ExecutorConfig, ToolAction, TurnOutcome, TurnOutput, EARLY_STOP_MESSAGE,
};
pub use prompts::PromptTemplate;
pub use retry::RetryPolicy;
pub use types::*;
