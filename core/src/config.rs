//! Client configuration.
//!
//! Built once at startup from defaults, the environment or a TOML document,
//! then handed to `HelpdeskClient::new`. Nothing mutates it afterwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ResponseMode;

pub const ENV_BASE_URL: &str = "HELPDESK_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "HELPDESK_TIMEOUT_MS";
pub const ENV_RESPONSE_MODE: &str = "HELPDESK_RESPONSE_MODE";

/// Transport configuration shared by every request of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and authority of the helpdesk backend, e.g. `https://desk.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How response bodies are decoded unless a request overrides it
    #[serde(default)]
    pub response_mode: ResponseMode,
}

fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            response_mode: ResponseMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Read `HELPDESK_BASE_URL`, `HELPDESK_TIMEOUT_MS` and
    /// `HELPDESK_RESPONSE_MODE`, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = timeout
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("{ENV_TIMEOUT_MS} is not a number: {timeout}")))?;
        }
        if let Some(mode) = lookup(ENV_RESPONSE_MODE) {
            config.response_mode = mode.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ApiError> {
        let mut config: Self = toml::from_str(source).map_err(|e| ApiError::Config(e.to_string()))?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let authority = self
            .base_url
            .strip_prefix("http://")
            .or_else(|| self.base_url.strip_prefix("https://"))
            .ok_or_else(|| ApiError::Config(format!("base_url must be http(s): {}", self.base_url)))?;
        if authority.is_empty() {
            return Err(ApiError::Config("base_url has no host".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ApiError::Config("timeout_ms must be greater than zero".to_string()));
        }
        Ok(())
    }
}
