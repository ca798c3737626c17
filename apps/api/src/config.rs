use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::LlmSettings;
use crate::tailoring::orchestrator::{RewriteFailurePolicy, TailorConfig};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare `cargo run` talks to a local Ollama.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm_endpoint: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub llm_retry_backoff_ms: u64,
    pub failure_policy: RewriteFailurePolicy,
    pub max_concurrent_rewrites: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            llm_endpoint: "http://localhost:11434".to_string(),
            llm_model: "llama3.2:3b".to_string(),
            llm_temperature: 0.3,
            llm_timeout_secs: 120,
            llm_max_retries: 0,
            llm_retry_backoff_ms: 1000,
            failure_policy: RewriteFailurePolicy::KeepOriginal,
            max_concurrent_rewrites: 1,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let failure_policy = match std::env::var("REWRITE_FAILURE_POLICY") {
            Ok(raw) => raw
                .parse::<RewriteFailurePolicy>()
                .map_err(|e| anyhow!(e))
                .context("REWRITE_FAILURE_POLICY is invalid")?,
            Err(_) => defaults.failure_policy,
        };

        let config = Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            llm_endpoint: std::env::var("LLM_ENDPOINT").unwrap_or(defaults.llm_endpoint),
            llm_model: std::env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_temperature: env_or("LLM_TEMPERATURE", defaults.llm_temperature)?,
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            llm_max_retries: env_or("LLM_MAX_RETRIES", defaults.llm_max_retries)?,
            llm_retry_backoff_ms: env_or("LLM_RETRY_BACKOFF_MS", defaults.llm_retry_backoff_ms)?,
            failure_policy,
            max_concurrent_rewrites: env_or(
                "MAX_CONCURRENT_REWRITES",
                defaults.max_concurrent_rewrites,
            )?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };

        if config.max_concurrent_rewrites == 0 {
            return Err(anyhow!("MAX_CONCURRENT_REWRITES must be at least 1"));
        }
        if config.llm_timeout_secs == 0 {
            return Err(anyhow!("LLM_TIMEOUT_SECS must be at least 1"));
        }

        Ok(config)
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            endpoint: self.llm_endpoint.clone(),
            model: self.llm_model.clone(),
            temperature: self.llm_temperature,
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }

    pub fn tailor_config(&self) -> TailorConfig {
        TailorConfig {
            failure_policy: self.failure_policy,
            inference_timeout: Duration::from_secs(self.llm_timeout_secs),
            max_retries: self.llm_max_retries,
            retry_backoff: Duration::from_millis(self.llm_retry_backoff_ms),
            max_concurrent_rewrites: self.max_concurrent_rewrites,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
