//! Simple types for the chat-model wrapper

use crate::domain::types::{Message, ModelReply, ToolDescriptor, ToolInvocation};

/// Context for a chat request
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub messages: Vec<Message>,
    /// Tools offered to the model; empty means a plain completion
    pub tools: Vec<ToolDescriptor>,
    pub temperature: Option<f32>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            ..Default::default()
        }
    }

    pub fn with_messages(mut self, messages: &[Message]) -> Self {
        self.messages = messages.to_vec();
        self
    }

    pub fn with_tools(mut self, tools: &[ToolDescriptor]) -> Self {
        self.tools = tools.to_vec();
        self
    }

    pub fn with_temperature(mut self, temp: Option<f32>) -> Self {
        self.temperature = temp;
        self
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a chat model
#[derive(Debug, Clone)]
pub struct Response {
    pub content: String,
    pub tool_calls: Vec<ToolInvocation>,
    pub model: String,
    pub usage: TokenUsage,
}

impl From<Response> for ModelReply {
    fn from(response: Response) -> Self {
        ModelReply {
            content: response.content,
            tool_calls: response.tool_calls,
        }
    }
}

/// Chat backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    OpenAI,
    Groq,
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAI => "openai",
            Provider::Groq => "groq",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Provider::Ollama),
            "openai" => Some(Provider::OpenAI),
            "groq" => Some(Provider::Groq),
            _ => None,
        }
    }

    /// Whether requests must carry an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }
}

/// Error type
#[derive(Debug)]
pub struct Error {
    pub message: String,
    pub provider: String,
}

impl Error {
    pub fn new(provider: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for Error {}

impl From<Error> for crate::domain::errors::Error {
    fn from(e: Error) -> Self {
        crate::domain::errors::Error::model_call(e.provider, e.message)
    }
}
