//! # Errors
//!
//! Typed failures for session setup and conversation turns.

use thiserror::Error;

/// Everything that can go wrong between the user, the model and the tool provider.
#[derive(Debug, Error)]
pub enum Error {
    /// The provider process could not be launched or the handshake did not complete.
    #[error("failed to connect to tool provider: {0}")]
    Connection(String),

    /// Tool listing failed, or the connection is not open.
    #[error("failed to query tool provider: {0}")]
    ProviderQuery(String),

    /// A specific invocation failed on the provider side.
    #[error("tool `{tool}` failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// The model asked for a tool the provider never advertised.
    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    /// Arguments were rejected by the advertised input schema before dispatch.
    #[error("invalid arguments for tool `{tool}`: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The provider advertised the same tool name twice.
    #[error("tool provider advertised `{0}` more than once")]
    DuplicateTool(String),

    /// The chat backend was unreachable or returned an error.
    #[error("[{provider}] model call failed: {message}")]
    ModelCall { provider: String, message: String },

    #[error("turn cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    /// Reading the prompt or writing output failed.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

impl Error {
    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn model_call(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelCall {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Errors after which the session cannot continue.
    ///
    /// Turn-level failures (tool, model, cancellation) leave the session usable
    /// for the next query.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::ProviderQuery(_) | Self::DuplicateTool(_)
                | Self::Config(_)
                | Self::Terminal(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
