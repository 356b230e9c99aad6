//! Scripted chat model for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::agent::client::ChatModel;
use crate::agent::types::*;
use crate::error::{Error, Result};

/// Replays canned responses in order; errors once the script runs out.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<ChatCompletionResponse>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<ChatCompletionResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Messages of every request received so far
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        _tools: Vec<ToolDefinition>,
        _options: GenerationOptions,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(messages);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Llm("upstream unavailable".to_string())))
    }
}

fn response_with(message: Message, finish_reason: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "chatcmpl-test".to_string(),
        model: "scripted".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: Some(finish_reason.to_string()),
        }],
        usage: None,
    }
}

/// A plain assistant answer
pub fn reply(content: &str) -> ChatCompletionResponse {
    response_with(Message::assistant(content), "stop")
}

/// An assistant turn requesting a single tool call
pub fn tool_call_reply(id: &str, name: &str, arguments: &str) -> ChatCompletionResponse {
    let mut message = Message::assistant("");
    message.tool_calls = Some(vec![AssistantToolCall {
        id: id.to_string(),
        call_type: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }]);
    response_with(message, "tool_calls")
}
