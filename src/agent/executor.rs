//! Tool-calling agent executor.
//!
//! Runs one conversational turn: sends the prompt, history and user input to
//! the model, executes whatever tools it asks for, feeds the results back and
//! repeats until the model answers without tool calls.

use crate::agent::client::ChatModel;
use crate::agent::prompts::system_prompt;
use crate::agent::types::*;
use crate::error::{Error, Result};
use crate::tools::{ToolCall, ToolRegistry};

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reply used when the model keeps calling tools past the iteration limit
pub const EARLY_STOP_MESSAGE: &str = "Agent stopped due to max iterations.";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Limits and sampling options for one turn.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum model round-trips before the turn is cut short.
    pub max_iterations: u32,
    /// Generation options sent with every request.
    pub generation_options: GenerationOptions,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            generation_options: GenerationOptions::with_temperature(1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Trace types
// ---------------------------------------------------------------------------

/// A tool call and what it returned.
#[derive(Debug, Clone)]
pub struct ToolAction {
    pub tool_name: String,
    pub arguments: String,
    pub observation: String,
    pub duration_ms: u64,
}

/// How the turn finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered without requesting tools.
    Completed,
    /// Hit `max_iterations` while the model was still calling tools.
    MaxIterationsExceeded,
}

/// Result of one executor run.
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// The final assistant reply.
    pub output: String,
    /// Tool calls made along the way, in order.
    pub actions: Vec<ToolAction>,
    /// Model round-trips used.
    pub iterations: u32,
    pub outcome: TurnOutcome,
    /// Token usage summed over every round-trip.
    pub usage: Usage,
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Binds a chat model, a prompt and a tool registry.
pub struct AgentExecutor {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    tool_definitions: Vec<ToolDefinition>,
    system_prompt: String,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Assemble an executor; the system prompt names every registered tool.
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        config: ExecutorConfig,
    ) -> Result<Self> {
        let system_prompt = system_prompt(&tools.names())?;
        let tool_definitions = tools.definitions();

        info!(
            "Agent assembled: model={}, {} tool(s) {:?}",
            model.model(),
            tools.count(),
            tools.names()
        );

        Ok(Self {
            model,
            tools,
            tool_definitions,
            system_prompt,
            config,
        })
    }

    /// Identifier of the chat model behind the loop
    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Run one turn on top of `history`.
    ///
    /// Model errors and tool errors abort the turn and are returned as-is.
    pub async fn run(&self, history: &[Message], input: &str) -> Result<TurnOutput> {
        let turn_start = Instant::now();

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend_from_slice(history);
        messages.push(Message::user(input));

        let mut actions: Vec<ToolAction> = Vec::new();
        let mut usage = Usage::default();

        for iteration in 1..=self.config.max_iterations {
            debug!(
                "Agent iteration {}/{}",
                iteration, self.config.max_iterations
            );

            let response = self
                .model
                .complete(
                    messages.clone(),
                    self.tool_definitions.clone(),
                    self.config.generation_options.clone(),
                )
                .await?;

            if let Some(ref delta) = response.usage {
                accumulate_usage(&mut usage, delta);
            }

            let message = response
                .first_message()
                .cloned()
                .ok_or_else(|| Error::Llm("Model returned no choices".to_string()))?;

            if !message.has_tool_calls() {
                info!(
                    "Turn finished: iterations={}, tool_calls={}, duration={}ms",
                    iteration,
                    actions.len(),
                    turn_start.elapsed().as_millis()
                );
                return Ok(TurnOutput {
                    output: message.content,
                    actions,
                    iterations: iteration,
                    outcome: TurnOutcome::Completed,
                    usage,
                });
            }

            let calls = message.tool_calls.clone().unwrap_or_default();
            info!("Model requested {} tool call(s)", calls.len());
            messages.push(message);

            for tc in calls {
                let action = self.call_tool(&tc).await?;
                messages.push(Message::tool(&tc.id, &action.observation));
                actions.push(action);
            }
        }

        warn!(
            "Agent stopped after {} iterations without a final answer",
            self.config.max_iterations
        );

        Ok(TurnOutput {
            output: EARLY_STOP_MESSAGE.to_string(),
            actions,
            iterations: self.config.max_iterations,
            outcome: TurnOutcome::MaxIterationsExceeded,
            usage,
        })
    }

    async fn call_tool(&self, tc: &AssistantToolCall) -> Result<ToolAction> {
        let tool_name = &tc.function.name;

        let args: serde_json::Value = match serde_json::from_str(&tc.function.arguments) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse tool arguments for {}: {}", tool_name, e);
                serde_json::json!({})
            }
        };

        info!("Executing tool: {}", tool_name);
        debug!("Tool {} arguments: {}", tool_name, tc.function.arguments);

        let call = ToolCall {
            id: tc.id.clone(),
            name: tool_name.clone(),
            arguments: args,
        };

        let tool_start = Instant::now();
        let result = self.tools.execute(&call).await.inspect_err(|e| {
            warn!("Tool {} failed: {}", tool_name, e);
        })?;
        let duration_ms = tool_start.elapsed().as_millis() as u64;

        let observation = result.llm_text();
        debug!(
            "Tool {} result ({} chars, {}ms): {}",
            tool_name,
            observation.len(),
            duration_ms,
            observation.chars().take(500).collect::<String>()
        );

        Ok(ToolAction {
            tool_name: tool_name.clone(),
            arguments: tc.function.arguments.clone(),
            observation,
            duration_ms,
        })
    }
}

/// Sum token usage from one response into an accumulator.
fn accumulate_usage(total: &mut Usage, delta: &Usage) {
    total.prompt_tokens += delta.prompt_tokens;
    total.completion_tokens += delta.completion_tokens;
    total.total_tokens += delta.total_tokens;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
