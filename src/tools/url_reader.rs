//! URL reader tool
//!
//! Fetches a web page, reduces it to readable text and asks the chat model
//! for a concise summary of it.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::traits::{parse_arguments, Tool, ToolResult};
use crate::agent::prompts::summary_prompt;
use crate::agent::{ChatModel, GenerationOptions, Message};
use crate::{Error, Result};

static NON_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<script\b.*?</script\s*>",
        r"|<style\b.*?</style\s*>",
        r"|<noscript\b.*?</noscript\s*>",
        r"|<!--.*?-->",
    ))
    .expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct ReaderArgs {
    url: String,
}

/// Page summarization tool
pub struct UrlReaderTool {
    client: Client,
    model: Arc<dyn ChatModel>,
    options: GenerationOptions,
    max_chars: usize,
}

impl UrlReaderTool {
    /// Create a new URL reader summarizing with `model`
    pub fn new(
        model: Arc<dyn ChatModel>,
        options: GenerationOptions,
        timeout_secs: u64,
        max_chars: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("toolchat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            model,
            options,
            max_chars,
        })
    }

    /// Fetch a page and return its readable text
    pub async fn load(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Provider(format!(
                "Fetching {} failed with status {}",
                url, status
            )));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.contains("html"));

        let body = response.text().await?;
        let text = if is_html {
            extract_text(&body)
        } else {
            body.trim().to_string()
        };

        Ok(truncate_chars(text, self.max_chars))
    }

    /// Summarize a page's text with a single model call
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = summary_prompt(text)?;
        let response = self
            .model
            .complete(vec![Message::user(prompt)], Vec::new(), self.options.clone())
            .await?;

        response
            .first_message()
            .map(|m| m.content.trim().to_string())
            .ok_or_else(|| Error::Llm("Summarization returned no choices".to_string()))
    }
}

#[async_trait]
impl Tool for UrlReaderTool {
    fn name(&self) -> &str {
        "url_reader"
    }

    fn description(&self) -> &str {
        "Read the content of a URL and return a summary."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL of the page to read"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: ReaderArgs = parse_arguments(args)?;
        let url = parse_http_url(&args.url)?;

        let text = self.load(&url).await?;
        debug!("Loaded {} chars from {}", text.chars().count(), url);

        let summary = self.summarize(&text).await?;
        info!("Summarized {} ({} chars)", url, summary.len());
        Ok(ToolResult::success(summary))
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidInput(format!(
            "Unsupported URL scheme '{}': only http and https can be read",
            other
        ))),
    }
}

/// Reduce an HTML document to its visible text
pub fn extract_text(html: &str) -> String {
    let without_scripts = NON_CONTENT.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_scripts, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}
