//! # LLM Providers
//!
//! Contains implementations for specific chat backends:
//! - Ollama native chat API (default, local)
//! - OpenAI-compatible chat completions (OpenAI, Groq)

mod ollama;
mod openai;

use reqwest::Client;

use crate::domain::config::LlmConfig;
use crate::infrastructure::llm::{Context, Error, Provider, Response};

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key (not needed for Ollama)
    pub api_key: Option<String>,
    /// Base URL (for non-default endpoints)
    pub base_url: Option<String>,
    /// Default model
    pub default_model: String,
    /// Timeout in seconds
    pub timeout: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_llm_config(provider: Provider, config: &LlmConfig) -> Result<Self, Error> {
        let api_key = if let Some(key) = &config.api_key {
            Some(key.clone())
        } else if let Some(env_var) = &config.api_key_env {
            Some(std::env::var(env_var).map_err(|e| {
                Error::new(
                    &config.provider,
                    format!("API key env var {} not set: {}", env_var, e),
                )
            })?)
        } else {
            None
        };

        if api_key.is_none() && provider.requires_api_key() {
            return Err(Error::new(
                &config.provider,
                "No API key provided - set api_key or api_key_env",
            ));
        }

        Ok(Self {
            api_key,
            base_url: config.endpoint.clone(),
            default_model: config.model.clone(),
            timeout: config.timeout,
        })
    }
}

/// Execute a chat request with the specified provider
pub async fn chat(
    http: &Client,
    provider: Provider,
    config: ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    match provider {
        Provider::Ollama => ollama::chat(http, config, context).await,
        Provider::OpenAI => openai::chat(http, "openai", config, context).await,
        Provider::Groq => {
            // Groq uses OpenAI-compatible API
            let config_with_url = ProviderConfig {
                base_url: Some(GROQ_BASE_URL.to_string()),
                ..config
            };
            openai::chat(http, "groq", config_with_url, context).await
        }
    }
}

/// Extract a provider error message from a non-success body, if it has one
fn error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    match json.get("error")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => other.get("message")?.as_str().map(str::to_string),
    }
}
