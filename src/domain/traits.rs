//! # Domain Traits
//!
//! Abstract interfaces for the two collaborators of a conversation: the tool
//! provider and the chat model. Concrete implementations live in the
//! Infrastructure layer.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::errors::Result;
use crate::domain::types::{Message, ModelReply, ToolDescriptor};

/// Abstract interface for a Tool Provider (e.g., an MCP server over stdio)
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Enumerate the tools the provider advertises
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Run one tool and return its output rendered as text
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<String>;

    /// Release the connection. Idempotent; teardown errors are logged, not returned.
    async fn close(&self);
}

/// Abstract interface for a chat model backend
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the transcript to the model.
    ///
    /// With `tools` the model may answer with invocation requests; without, it
    /// is expected to reply with plain content.
    async fn chat(&self, messages: &[Message], tools: Option<&[ToolDescriptor]>) -> Result<ModelReply>;

    /// Identifier of the model answering requests
    fn model_id(&self) -> &str;
}
