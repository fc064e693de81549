//! Simple chat-model wrapper for multiple providers
//!
//! Provides a unified, tool-aware interface over Ollama's native chat API and
//! OpenAI-compatible chat completions (OpenAI, Groq).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mcp_chat::domain::config::LlmConfig;
//! use mcp_chat::domain::traits::ChatModel;
//! use mcp_chat::domain::types::Message;
//! use mcp_chat::infrastructure::llm::Client;
//!
//! # async fn run() -> mcp_chat::domain::errors::Result<()> {
//! let client = Client::from_config(&LlmConfig::default())?;
//! let reply = client.chat(&[Message::user("Hello, world!")], None).await?;
//! println!("Response: {}", reply.content);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod providers;
mod types;

pub use client::Client;

pub use types::{Context, Error, Provider, Response, TokenUsage};
