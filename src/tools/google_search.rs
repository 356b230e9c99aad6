//! Google search tool
//!
//! Web search through the Google Custom Search JSON API. Requires an API key
//! and a programmable search engine id.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::traits::{parse_arguments, Tool, ToolResult};
use crate::config::SearchConfig;
use crate::{Error, Result};

/// Placeholder returned when the search finds nothing
pub const NO_RESULTS_MESSAGE: &str = "No good Google Search Result was found";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

/// Custom Search API response
#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Debug, Deserialize)]
struct CustomSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// A single search hit as handed to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Page title
    pub title: String,
    /// Page URL
    pub link: String,
    /// Result snippet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Google search tool
pub struct GoogleSearchTool {
    client: Client,
    config: SearchConfig,
}

impl GoogleSearchTool {
    /// Create a new search tool
    pub fn new(config: SearchConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Return the top results for a query
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let (api_key, engine_id) = match (&self.config.api_key, &self.config.engine_id) {
            (Some(key), Some(cx)) => (key.expose_secret(), cx.as_str()),
            _ => {
                return Err(Error::Config(
                    "GOOGLE_API_KEY and GOOGLE_CSE_ID are required for google_search".to_string(),
                ))
            }
        };

        let url = format!(
            "{}/customsearch/v1",
            self.config.base_url.trim_end_matches('/')
        );
        let count = self.config.result_count.to_string();

        debug!("Google search: {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key),
                ("cx", engine_id),
                ("q", query),
                ("num", count.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "Google search failed with status {}: {}",
                status, text
            )));
        }

        let body: CustomSearchResponse = response.json().await?;

        Ok(body
            .items
            .into_iter()
            .take(self.config.result_count as usize)
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn name(&self) -> &str {
        "google_search"
    }

    fn description(&self) -> &str {
        "Perform a Google search and return the top 5 results."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: SearchArgs = parse_arguments(args)?;
        let results = self.search(&args.query).await?;

        if results.is_empty() {
            return Ok(ToolResult::json(
                &serde_json::json!([{ "Result": NO_RESULTS_MESSAGE }]),
            ));
        }

        Ok(ToolResult::json(&serde_json::to_value(&results)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SearchConfig {
        SearchConfig {
            api_key: Some(SecretString::from("google-key")),
            engine_id: Some("engine-1".to_string()),
            base_url: server.uri(),
            result_count: 5,
        }
    }

    #[tokio::test]
    async fn test_returns_top_results() {
        let server = MockServer::start().await;
        let items: Vec<Value> = (1..=7)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Result {}", i),
                    "link": format!("https://example.com/{}", i),
                    "snippet": "rust"
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("key", "google-key"))
            .and(query_param("cx", "engine-1"))
            .and(query_param("q", "rust async"))
            .and(query_param("num", "5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = GoogleSearchTool::new(config_for(&server), 5).unwrap();
        let result = tool
            .execute(serde_json::json!({"query": "rust async"}))
            .await
            .unwrap();

        let value: Value = serde_json::from_str(&result.llm_text()).unwrap();
        let hits = value.as_array().unwrap();
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0]["title"], "Result 1");
        assert_eq!(hits[0]["link"], "https://example.com/1");
    }

    #[tokio::test]
    async fn test_no_items_yields_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "searchInformation": {"totalResults": "0"}
            })))
            .mount(&server)
            .await;

        let tool = GoogleSearchTool::new(config_for(&server), 5).unwrap();
        let result = tool
            .execute(serde_json::json!({"query": "zzzz"}))
            .await
            .unwrap();

        let value: Value = serde_json::from_str(&result.llm_text()).unwrap();
        assert_eq!(value[0]["Result"], NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota"))
            .mount(&server)
            .await;

        let tool = GoogleSearchTool::new(config_for(&server), 5).unwrap();
        let err = tool
            .execute(serde_json::json!({"query": "rust"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_missing_credentials_is_config_error() {
        let config = SearchConfig {
            api_key: None,
            engine_id: None,
            base_url: "http://127.0.0.1:9".to_string(),
            result_count: 5,
        };
        let tool = GoogleSearchTool::new(config, 5).unwrap();
        let err = tool.search("rust").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_query_is_invalid_input() {
        let server = MockServer::start().await;
        let tool = GoogleSearchTool::new(config_for(&server), 5).unwrap();
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
