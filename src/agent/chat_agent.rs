//! History-aware, retrying chat agent
//!
//! Wraps the executor so every turn is run against a session's history and
//! recorded into it once it succeeds.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::agent::client::{ChatModel, OpenAIClient};
use crate::agent::conversation::{Conversation, SessionStore};
use crate::agent::executor::{AgentExecutor, ExecutorConfig};
use crate::agent::retry::RetryPolicy;
use crate::config::Config;
use crate::error::Result;
use crate::tools::builtin_registry;

/// The assembled chat agent
pub struct ChatAgent {
    executor: AgentExecutor,
    store: Mutex<SessionStore>,
    retry: RetryPolicy,
    session_id: String,
}

impl ChatAgent {
    /// Wrap an executor with history and retries for `session_id`
    pub fn new(executor: AgentExecutor, retry: RetryPolicy, session_id: impl Into<String>) -> Self {
        let store = SessionStore::new(executor.model_name());
        Self {
            executor,
            store: Mutex::new(store),
            retry,
            session_id: session_id.into(),
        }
    }

    /// Assemble the OpenAI-backed agent with the built-in tools
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OpenAIClient::new(config.openai.clone())?;
        let options = client.default_options();
        let model: Arc<dyn ChatModel> = Arc::new(client);
        let tools = builtin_registry(config, model.clone(), options.clone())?;

        let executor = AgentExecutor::new(
            model,
            tools,
            ExecutorConfig {
                max_iterations: config.agent.max_iterations,
                generation_options: options,
            },
        )?;

        Ok(Self::new(
            executor,
            RetryPolicy::from_config(&config.agent),
            &config.agent.session_id,
        ))
    }

    /// The fixed session every front end talks to
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Answer `message` in the fixed session
    pub async fn respond(&self, message: &str) -> Result<String> {
        self.respond_in(&self.session_id, message).await
    }

    /// Answer `message` in `session_id`.
    ///
    /// The whole turn is retried per the policy. History is only appended
    /// (user first, then assistant) when a turn succeeds. Turns are
    /// serialized: the store stays locked until the reply is recorded.
    pub async fn respond_in(&self, session_id: &str, message: &str) -> Result<String> {
        let mut store = self.store.lock().await;
        let conversation = store.get_or_create(session_id);
        let history = conversation.messages();

        debug!(
            "Turn in session {} with {} prior message(s)",
            session_id,
            conversation.message_count()
        );

        let executor = &self.executor;
        let history = &history;
        let turn = self
            .retry
            .retry("Agent turn", move || executor.run(history, message))
            .await?;

        store
            .get_or_create(session_id)
            .record_exchange(message, turn.output.as_str());

        info!(
            "Turn complete: session={}, tool_calls={}, tokens={}",
            session_id,
            turn.actions.len(),
            turn.usage.total_tokens
        );

        Ok(turn.output)
    }

    /// Snapshot of a session's conversation, if it has one
    pub async fn conversation(&self, session_id: &str) -> Option<Conversation> {
        self.store.lock().await.get(session_id).cloned()
    }

}
