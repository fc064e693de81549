//! # Session
//!
//! Owns one tool-provider connection, the tool catalog built from it and the
//! transcript. Created once at startup; `close` releases the provider.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::application::orchestrator::Orchestrator;
use crate::domain::catalog::ToolCatalog;
use crate::domain::config::{AppConfig, ConversationConfig};
use crate::domain::errors::Result;
use crate::domain::traits::{ChatModel, ToolProvider};
use crate::domain::transcript::Transcript;
use crate::infrastructure::llm::Client as LlmClient;
use crate::infrastructure::mcp::{McpConnection, ServerEndpoint};

pub struct Session {
    provider: Arc<dyn ToolProvider>,
    orchestrator: Orchestrator,
    transcript: Transcript,
}

impl Session {
    /// Connect to the server at `server`, discover its tools and prepare the
    /// model client described by `config`.
    pub async fn start(server: &Path, config: &AppConfig) -> Result<Self> {
        let model = LlmClient::from_config(&config.llm)?;
        tracing::info!(provider = model.provider().as_str(), model = model.model_id(), "Using model");

        let span = tracing::info_span!("session", server = %server.display());
        let endpoint = ServerEndpoint::resolve(server, &config.server);
        let connection = McpConnection::connect_with_span(endpoint, &config.server, span.clone()).await?;

        let session = Self::from_parts(Arc::new(connection), Arc::new(model), &config.conversation).await?;
        Ok(session.with_span(span))
    }

    /// Log turns under `span` instead of the default conversation span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.orchestrator = self.orchestrator.with_span(span);
        self
    }

    /// Build a session over an already connected provider.
    ///
    /// The provider is closed if tool discovery fails.
    pub async fn from_parts(
        provider: Arc<dyn ToolProvider>,
        model: Arc<dyn ChatModel>,
        config: &ConversationConfig,
    ) -> Result<Self> {
        let catalog = match provider.list_tools().await.and_then(ToolCatalog::build) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(error = %e, "Tool discovery failed");
                provider.close().await;
                return Err(e);
            }
        };
        tracing::info!(tools = ?catalog.names(), "Connected to server with tools");

        let orchestrator = Orchestrator::new(provider.clone(), model, catalog, config);
        Ok(Self {
            provider,
            orchestrator,
            transcript: Transcript::new(),
        })
    }

    /// Run one conversation turn.
    pub async fn ask(&mut self, query: &str, cancel: &CancellationToken) -> Result<String> {
        self.orchestrator
            .run_turn(&mut self.transcript, query, cancel)
            .await
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn catalog(&self) -> &ToolCatalog {
        self.orchestrator.catalog()
    }

    pub async fn close(&self) {
        self.provider.close().await;
    }
}
