//! Configuration management for toolchat
//!
//! Loads configuration from environment variables and the local `.env` file.

use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Session id shared by every turn of the process
pub const DEFAULT_SESSION_ID: &str = "test-session";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

/// OpenAI chat-completions configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for OpenAI
    pub api_key: SecretString,
    /// Model to use
    pub model: String,
    /// Base URL for the API
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// OpenWeatherMap configuration
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// API key (sent as `appid`)
    pub api_key: SecretString,
    /// Base URL for the One Call API
    pub base_url: String,
    /// Measurement units
    pub units: String,
}

/// Google Custom Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// API key for the Custom Search JSON API
    pub api_key: Option<SecretString>,
    /// Programmable search engine id
    pub engine_id: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Number of results returned to the model
    pub result_count: u8,
}

/// Settings shared by the tool adapters
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum characters of page text handed to the summarizer
    pub reader_max_chars: usize,
    /// Weather settings
    pub weather: WeatherConfig,
    /// Search settings
    pub search: SearchConfig,
}

/// Agent invocation policy
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Session the front ends attach history to
    pub session_id: String,
    /// Attempts per turn before the error reaches the caller
    pub max_attempts: u32,
    /// Model round-trips allowed per turn
    pub max_iterations: u32,
    /// First retry delay in milliseconds
    pub retry_initial_interval_ms: u64,
    /// Upper bound on a retry delay in milliseconds
    pub retry_max_interval_ms: u64,
}

/// Web front end settings
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Bind address
    pub host: String,
    /// Port
    pub port: u16,
}

impl WebConfig {
    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                Error::Config(format!(
                    "Invalid bind address {}:{}: {}",
                    self.host, self.port, e
                ))
            })
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter
    pub level: String,
    /// Log format (pretty, json)
    pub format: String,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat model settings
    pub openai: OpenAIConfig,
    /// Tool adapter settings
    pub tools: ToolsConfig,
    /// Agent policy
    pub agent: AgentConfig,
    /// Web server settings
    pub web: WebConfig,
    /// Logging settings
    pub log: LogConfig,
}

/// Reload secrets from `.env`, returning the file that was read.
///
/// `OPENAI_API_KEY` is dropped from the process environment first so the
/// value in `.env` wins over whatever the parent shell exported. This
/// mutates the process environment: call it before any threads start.
pub fn load_environment() -> std::result::Result<PathBuf, dotenvy::Error> {
    std::env::remove_var("OPENAI_API_KEY");
    dotenvy::dotenv()
}

impl Config {

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            openai: OpenAIConfig {
                api_key: SecretString::from(lookup("OPENAI_API_KEY").unwrap_or_default()),
                model: var("OPENAI_MODEL", DEFAULT_MODEL),
                base_url: var("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                temperature: parse_var("OPENAI_TEMPERATURE", var("OPENAI_TEMPERATURE", "1.0"))?,
                timeout_secs: parse_var("OPENAI_TIMEOUT", var("OPENAI_TIMEOUT", "120"))?,
            },
            tools: ToolsConfig {
                timeout_secs: parse_var("TOOL_TIMEOUT", var("TOOL_TIMEOUT", "30"))?,
                reader_max_chars: parse_var(
                    "URL_READER_MAX_CHARS",
                    var("URL_READER_MAX_CHARS", "20000"),
                )?,
                weather: WeatherConfig {
                    api_key: SecretString::from(lookup("WEATHER_API_KEY").unwrap_or_default()),
                    base_url: var("WEATHER_BASE_URL", "https://api.openweathermap.org"),
                    units: var("WEATHER_UNITS", "imperial"),
                },
                search: SearchConfig {
                    api_key: lookup("GOOGLE_API_KEY").map(SecretString::from),
                    engine_id: lookup("GOOGLE_CSE_ID"),
                    base_url: var("GOOGLE_SEARCH_BASE_URL", "https://www.googleapis.com"),
                    result_count: 5,
                },
            },
            agent: AgentConfig {
                session_id: DEFAULT_SESSION_ID.to_string(),
                max_attempts: parse_var("AGENT_MAX_ATTEMPTS", var("AGENT_MAX_ATTEMPTS", "3"))?,
                max_iterations: parse_var(
                    "AGENT_MAX_ITERATIONS",
                    var("AGENT_MAX_ITERATIONS", "15"),
                )?,
                retry_initial_interval_ms: 500,
                retry_max_interval_ms: 5_000,
            },
            web: WebConfig {
                host: var("WEB_HOST", "0.0.0.0"),
                port: parse_var("WEB_PORT", var("WEB_PORT", "7860"))?,
            },
            log: LogConfig {
                level: var("RUST_LOG", "info,toolchat=debug"),
                format: var("LOG_FORMAT", "pretty"),
            },
        })
    }

    /// Create a minimal config for tests and offline use
    pub fn minimal() -> Self {
        Config {
            openai: OpenAIConfig {
                api_key: SecretString::from(""),
                model: DEFAULT_MODEL.to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                temperature: 1.0,
                timeout_secs: 120,
            },
            tools: ToolsConfig {
                timeout_secs: 30,
                reader_max_chars: 20_000,
                weather: WeatherConfig {
                    api_key: SecretString::from(""),
                    base_url: "https://api.openweathermap.org".to_string(),
                    units: "imperial".to_string(),
                },
                search: SearchConfig {
                    api_key: None,
                    engine_id: None,
                    base_url: "https://www.googleapis.com".to_string(),
                    result_count: 5,
                },
            },
            agent: AgentConfig {
                session_id: DEFAULT_SESSION_ID.to_string(),
                max_attempts: 3,
                max_iterations: 15,
                retry_initial_interval_ms: 500,
                retry_max_interval_ms: 5_000,
            },
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 7860,
            },
            log: LogConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    /// Validate that all required configuration is present
    pub fn validate(&self) -> Result<()> {
        if self.openai.api_key.expose_secret().is_empty() {
            return Err(Error::Config("OPENAI_API_KEY is required".to_string()));
        }
        if self.agent.max_attempts == 0 {
            return Err(Error::Config("AGENT_MAX_ATTEMPTS must be at least 1".to_string()));
        }
        if self.agent.max_iterations == 0 {
            return Err(Error::Config("AGENT_MAX_ITERATIONS must be at least 1".to_string()));
        }
        if !matches!(self.log.format.as_str(), "pretty" | "json") {
            return Err(Error::Config(format!(
                "Invalid LOG_FORMAT: {}. Valid options: pretty, json",
                self.log.format
            )));
        }

        // Tools degrade at call time; only warn here
        if self.tools.weather.api_key.expose_secret().is_empty() {
            tracing::warn!("WEATHER_API_KEY is not set; current_weather will report failures");
        }
        if self.tools.search.api_key.is_none() || self.tools.search.engine_id.is_none() {
            tracing::warn!("GOOGLE_API_KEY / GOOGLE_CSE_ID not set; google_search will fail");
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: String) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {:?} ({})", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.openai.model, DEFAULT_MODEL);
        assert_eq!(config.openai.temperature, 1.0);
        assert_eq!(config.agent.session_id, DEFAULT_SESSION_ID);
        assert_eq!(config.agent.max_attempts, 3);
        assert_eq!(config.agent.max_iterations, 15);
        assert_eq!(config.tools.weather.units, "imperial");
        assert_eq!(config.tools.search.result_count, 5);
        assert_eq!(config.web.port, 7860);
        assert!(config.validate().is_err()); // no API key
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("WEATHER_API_KEY", "weather-key"),
            ("AGENT_MAX_ATTEMPTS", "5"),
            ("WEB_PORT", "8080"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.openai.api_key.expose_secret(), "sk-test");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.tools.weather.api_key.expose_secret(), "weather-key");
        assert_eq!(config.agent.max_attempts, 5);
        assert_eq!(config.web.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("WEB_PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("WEB_PORT"));
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::minimal();
        assert!(config.validate().is_err()); // Should fail validation
        assert_eq!(config.web.socket_addr().unwrap().port(), 7860);
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::minimal();
        config.openai.api_key = SecretString::from("sk-test");
        config.log.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shell_api_key_is_discarded() {
        std::env::set_var("OPENAI_API_KEY", "sk-from-shell");

        match load_environment() {
            Ok(path) => assert!(path.ends_with(".env")),
            Err(_) => assert!(std::env::var("OPENAI_API_KEY").is_err()),
        }
        assert_ne!(
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
            Some("sk-from-shell")
        );
    }
}
