//! OpenAI chat-completions client

use crate::agent::types::*;
use crate::config::OpenAIConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

/// A hosted chat model the agent can talk to.
///
/// The executor and the URL summarizer only see this trait, so tests can
/// script replies without a network.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier sent with each request
    fn model(&self) -> &str;

    /// Run one completion. An empty `tools` slice disables function calling.
    async fn complete(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        options: GenerationOptions,
    ) -> Result<ChatCompletionResponse>;
}

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAIClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: OpenAIConfig,
}

impl OpenAIClient {
    /// Create a new OpenAI client
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!(
                "Bearer {}",
                config.api_key.expose_secret()
            ))
            .map_err(|e| Error::Config(format!("Invalid API key format: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(OpenAIClient { client, config })
    }

    /// Generation options from the configured temperature
    pub fn default_options(&self) -> GenerationOptions {
        GenerationOptions::with_temperature(self.config.temperature)
    }

    /// Send a request to the chat-completions endpoint
    async fn send_request(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        debug!(
            "Sending request to OpenAI: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.as_ref().map_or(0, Vec::len)
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("Chat completion timed out: {}", e))
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();

        if status.is_success() {
            let body = response.json::<ChatCompletionResponse>().await?;

            if let Some(ref usage) = body.usage {
                info!(
                    "OpenAI response: model={}, tokens={}",
                    body.model, usage.total_tokens
                );
            }

            Ok(body)
        } else {
            let error_text = response.text().await.unwrap_or_default();

            match status.as_u16() {
                429 => {
                    warn!("Rate limit exceeded: {}", error_text);
                    Err(Error::RateLimit(error_text))
                }
                401 => Err(Error::Unauthorized("Invalid API key".to_string())),
                _ => Err(Error::Llm(format!("API error ({}): {}", status, error_text))),
            }
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        options: GenerationOptions,
    ) -> Result<ChatCompletionResponse> {
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            (Some(tools), Some("auto".to_string()))
        };

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            stop: options.stop,
            tools,
            tool_choice,
        };

        self.send_request(request).await
    }
}
