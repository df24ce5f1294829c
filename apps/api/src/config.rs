use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::TransportMode;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub ollama_host: String,
    pub ollama_port: u16,
    /// Binary used by the process transport.
    pub ollama_bin: String,
    pub model_name: String,
    pub model_transport: TransportMode,
    pub model_timeout: Duration,
    /// Conversation turns embedded in refinement prompts.
    pub history_window: usize,
    pub catalog_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ollama_host: std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            ollama_port: parse_env("OLLAMA_PORT", 11434)?,
            ollama_bin: std::env::var("OLLAMA_BIN").unwrap_or_else(|_| "ollama".to_string()),
            model_name: std::env::var("MODEL_NAME")
                .unwrap_or_else(|_| "deepseek-r1:1.5b".to_string()),
            model_transport: match std::env::var("MODEL_TRANSPORT") {
                Ok(value) => TransportMode::from_str(&value).map_err(|e| anyhow!(e))?,
                Err(_) => TransportMode::HttpThenProcess,
            },
            model_timeout: Duration::from_secs(parse_env("MODEL_TIMEOUT_SECS", 60)?),
            history_window: parse_env("HISTORY_WINDOW", 5)?,
            catalog_ttl: Duration::from_secs(parse_env("CATALOG_TTL_SECS", 300)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{value}'")),
        Err(_) => Ok(default),
    }
}
