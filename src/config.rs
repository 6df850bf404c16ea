//! Process configuration, read once from the environment at startup

use crate::llm::DEFAULT_BASE_URL;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GROQ_API_KEY is not set. Export it before starting the server.")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub port: u16,
    /// Timeout applied by the provider client to each request
    pub request_timeout: Duration,
}

impl Config {
    /// # Errors
    ///
    /// Fails when `GROQ_API_KEY` is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GROQ_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = lookup("GROQ_BASE_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let port = lookup("LIMITLY_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs = lookup("LIMITLY_HTTP_TIMEOUT_SECS")
            .and_then(|t| t.parse().ok())
            .filter(|&t| t > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_key,
            base_url,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
