//! Current weather tool
//!
//! Looks up current conditions through the OpenWeatherMap One Call API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{parse_arguments, Tool, ToolResult};
use crate::config::WeatherConfig;
use crate::Result;

/// Default latitude (Atlanta, GA)
pub const DEFAULT_LATITUDE: &str = "33.79";

/// Default longitude (Atlanta, GA)
pub const DEFAULT_LONGITUDE: &str = "-84.36";

/// Sections of the One Call response we never ask for
const EXCLUDED_SECTIONS: &str = "minutely,hourly,daily,alerts";

/// Status reported in the error envelope, whatever the upstream returned
const ENVELOPE_STATUS: u16 = 500;

fn default_latitude() -> String {
    DEFAULT_LATITUDE.to_string()
}

fn default_longitude() -> String {
    DEFAULT_LONGITUDE.to_string()
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    #[serde(default = "default_latitude")]
    latitude: String,
    #[serde(default = "default_longitude")]
    longitude: String,
}

/// Envelope returned to the model when the weather service rejects a request
pub fn error_envelope() -> Value {
    serde_json::json!({
        "error": "Failed to fetch weather data",
        "status": ENVELOPE_STATUS,
    })
}

/// Weather lookup tool
pub struct CurrentWeatherTool {
    client: Client,
    config: WeatherConfig,
}

impl CurrentWeatherTool {
    /// Create a new weather tool
    pub fn new(config: WeatherConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch the `current` block for a coordinate pair.
    ///
    /// A non-200 answer yields the error envelope instead of an `Err`.
    pub async fn current(&self, latitude: &str, longitude: &str) -> Result<Value> {
        let url = format!(
            "{}/data/3.0/onecall",
            self.config.base_url.trim_end_matches('/')
        );

        debug!("Fetching weather for lat={}, lon={}", latitude, longitude);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude),
                ("lon", longitude),
                ("exclude", EXCLUDED_SECTIONS),
                ("appid", self.config.api_key.expose_secret()),
                ("units", self.config.units.as_str()),
            ])
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            warn!("Weather API returned status {}", response.status());
            return Ok(error_envelope());
        }

        let mut body: Value = response.json().await?;
        Ok(body
            .get_mut("current")
            .map(Value::take)
            .unwrap_or_else(|| Value::Object(Default::default())))
    }
}

#[async_trait]
impl Tool for CurrentWeatherTool {
    fn name(&self) -> &str {
        "current_weather"
    }

    fn description(&self) -> &str {
        "Return the current weather for a given latitude and longitude."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "latitude": {
                    "type": "string",
                    "description": "Latitude in decimal degrees",
                    "default": DEFAULT_LATITUDE
                },
                "longitude": {
                    "type": "string",
                    "description": "Longitude in decimal degrees",
                    "default": DEFAULT_LONGITUDE
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: WeatherArgs = parse_arguments(args)?;
        let weather = self.current(&args.latitude, &args.longitude).await?;
        Ok(ToolResult::json(&weather))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer) -> CurrentWeatherTool {
        let config = WeatherConfig {
            api_key: SecretString::from("weather-key"),
            base_url: server.uri(),
            units: "imperial".to_string(),
        };
        CurrentWeatherTool::new(config, 5).unwrap()
    }

    #[tokio::test]
    async fn test_returns_current_block() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .and(query_param("lat", "40.71"))
            .and(query_param("lon", "-74.01"))
            .and(query_param("exclude", "minutely,hourly,daily,alerts"))
            .and(query_param("appid", "weather-key"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "lat": 40.71,
                "current": {"temp": 71.3, "weather": [{"main": "Clear"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool_for(&server)
            .execute(serde_json::json!({"latitude": "40.71", "longitude": "-74.01"}))
            .await
            .unwrap();

        let value: Value = serde_json::from_str(&result.llm_text()).unwrap();
        assert_eq!(value["temp"], 71.3);
        assert_eq!(value["weather"][0]["main"], "Clear");
    }

    #[tokio::test]
    async fn test_defaults_to_atlanta() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("lat", DEFAULT_LATITUDE))
            .and(query_param("lon", DEFAULT_LONGITUDE))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool_for(&server).execute(serde_json::json!({})).await.unwrap();
        // Missing `current` yields an empty object
        assert_eq!(result.llm_text(), "{}");
    }

    #[tokio::test]
    async fn test_non_200_returns_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let result = tool_for(&server).execute(serde_json::json!({})).await.unwrap();
        assert!(result.success);

        let value: Value = serde_json::from_str(&result.llm_text()).unwrap();
        assert_eq!(value["error"], "Failed to fetch weather data");
        assert_eq!(value["status"], 500);
    }

    #[tokio::test]
    async fn test_server_error_returns_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let value = tool_for(&server).current("1", "2").await.unwrap();
        assert_eq!(value, error_envelope());
    }
}
