//! # LLM Client
//!
//! Provides the `Client` struct, the `ChatModel` implementation used by the
//! orchestrator. It routes requests to the configured provider and logs each call.

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::config::LlmConfig;
use crate::domain::errors::{Error as DomainError, Result as DomainResult};
use crate::domain::traits::ChatModel;
use crate::domain::types::{Message, ModelReply, ToolDescriptor};
use crate::infrastructure::llm::providers::{self, ProviderConfig};
use crate::infrastructure::llm::{Context, Error, Provider, Response};

/// Simple chat-model client
pub struct Client {
    http: reqwest::Client,
    provider: Provider,
    provider_config: ProviderConfig,
    temperature: Option<f32>,
}

impl Client {
    /// Create a client from the `llm` configuration section
    pub fn from_config(config: &LlmConfig) -> DomainResult<Self> {
        let provider = Provider::from_str(&config.provider)
            .ok_or_else(|| DomainError::Config(format!("Unknown provider: {}", config.provider)))?;

        let provider_config = ProviderConfig::from_llm_config(provider, config)
            .map_err(|e| DomainError::Config(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            provider,
            provider_config,
            temperature: config.temperature,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Send a chat request with full context
    pub async fn send(&self, context: Context) -> Result<Response, Error> {
        providers::chat(&self.http, self.provider, self.provider_config.clone(), context).await
    }
}

#[async_trait]
impl ChatModel for Client {
    async fn chat(&self, messages: &[Message], tools: Option<&[ToolDescriptor]>) -> DomainResult<ModelReply> {
        let mut context = Context::new()
            .with_messages(messages)
            .with_temperature(self.temperature);
        if let Some(tools) = tools {
            context = context.with_tools(tools);
        }

        let start = Instant::now();
        let result = self.send(context).await;
        let duration = start.elapsed();

        match result {
            Ok(response) => {
                tracing::info!(
                    provider = self.provider.as_str(),
                    model = %response.model,
                    duration_ms = %duration.as_millis(),
                    prompt_tokens = response.usage.prompt_tokens,
                    completion_tokens = response.usage.completion_tokens,
                    tool_calls = response.tool_calls.len(),
                    "LLM request completed"
                );
                Ok(response.into())
            }
            Err(e) => {
                tracing::error!(
                    provider = self.provider.as_str(),
                    model = %self.provider_config.default_model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "LLM request failed"
                );
                Err(e.into())
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.provider_config.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(Provider::from_str("ollama"), Some(Provider::Ollama));
        assert_eq!(Provider::from_str("OpenAI"), Some(Provider::OpenAI));
        assert_eq!(Provider::from_str("groq"), Some(Provider::Groq));
        assert_eq!(Provider::from_str("unknown"), None);
    }

    #[test]
    fn test_provider_as_str() {
        assert_eq!(Provider::Ollama.as_str(), "ollama");
        assert_eq!(Provider::OpenAI.as_str(), "openai");
        assert_eq!(Provider::Groq.as_str(), "groq");
    }

    #[test]
    fn test_from_default_config() {
        let client = Client::from_config(&LlmConfig::default()).unwrap();
        assert_eq!(client.provider(), Provider::Ollama);
        assert_eq!(client.model_id(), "qwen3:1.7b");
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(Client::from_config(&config), Err(DomainError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_model_call_error() {
        let config = LlmConfig {
            // nothing listens on the discard port
            endpoint: Some("http://127.0.0.1:9".to_string()),
            timeout: Some(2),
            ..LlmConfig::default()
        };
        let client = Client::from_config(&config).unwrap();
        let err = client.chat(&[Message::user("hi")], None).await.unwrap_err();
        assert!(matches!(err, DomainError::ModelCall { provider, .. } if provider == "ollama"));
    }
}
