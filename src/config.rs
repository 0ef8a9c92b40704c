//! Process configuration
//!
//! Built once at startup from the environment (after `.env` is loaded)
//! and passed by reference to the components that need it.

use crate::error::PlannerError;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub max_retries: u32,
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.0,
            max_output_tokens: None,
            max_retries: 2,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Upper bound on model -> tool -> model round trips per chat turn.
    pub max_tool_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_tool_rounds: 5 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        let gemini = GeminiConfig {
            api_key: get("GEMINI_API_KEY").unwrap_or_default(),
            model: get("GEMINI_MODEL").unwrap_or(defaults.gemini.model),
            base_url: get("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini.base_url),
            temperature: parse_or(&get, "GEMINI_TEMPERATURE", defaults.gemini.temperature)?,
            max_output_tokens: parse_opt(&get, "GEMINI_MAX_OUTPUT_TOKENS")?,
            max_retries: parse_or(&get, "GEMINI_MAX_RETRIES", defaults.gemini.max_retries)?,
            timeout: parse_opt::<u64, _>(&get, "GEMINI_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        let port = match get("PORT") {
            Some(_) => parse_or(&get, "PORT", defaults.server.port)?,
            None => parse_or(&get, "API_PORT", defaults.server.port)?,
        };
        let server = ServerConfig {
            host: get("HOST").unwrap_or(defaults.server.host),
            port,
        };

        let agent = AgentConfig {
            max_tool_rounds: parse_or(&get, "MAX_TOOL_ROUNDS", defaults.agent.max_tool_rounds)?,
        };
        if agent.max_tool_rounds == 0 {
            return Err(PlannerError::ConfigError(
                "MAX_TOOL_ROUNDS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            gemini,
            server,
            agent,
        })
    }
}

fn parse_opt<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                PlannerError::ConfigError(format!("{}={:?} is invalid: {}", key, raw, e))
            })
        })
        .transpose()
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(get, key)?.unwrap_or(default))
}
