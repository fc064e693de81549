//! # Configuration
//!
//! Loads the optional `config.yaml` and defines the structs for the model backend,
//! the tool-provider process, the conversation loop and logging. Every section
//! has defaults, so the client runs with no file at all.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::errors::{Error, Result};

pub const CONFIG_FILE: &str = "config.yaml";
pub const CONFIG_DIR: &str = "mcp-chat";

/// Main application configuration structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parse a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse YAML: {e}")))
    }

    /// Load from an explicit path, or from `<config dir>/mcp-chat/config.yaml`
    /// when present, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Chat model backend settings.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>, // e.g. "OPENAI_API_KEY"
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            api_key_env: None,
            timeout: None,
            temperature: None,
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "qwen3:1.7b".to_string()
}

/// How the tool-provider process is launched and talked to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interpreter used for `.py` server scripts
    #[serde(default = "default_python")]
    pub python: String,
    /// Interpreter used for `.js` server scripts
    #[serde(default = "default_node")]
    pub node: String,
    /// Seconds allowed for the initialize handshake
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: u64,
    /// Seconds allowed for a single tools/list or tools/call request
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            node: default_node(),
            handshake_timeout: default_handshake_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_python() -> String {
    "python".to_string()
}
fn default_node() -> String {
    "node".to_string()
}
fn default_handshake_timeout() -> u64 {
    30
}
fn default_request_timeout() -> u64 {
    60
}

/// What the transcript keeps between turns.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Keep every prior turn.
    #[default]
    Full,
    /// Keep the most recent `turns` turns, including the one being started.
    LastTurns { turns: usize },
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConversationConfig {
    /// Tool rounds per user query before the model must answer without tools
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    #[serde(default)]
    pub history: HistoryPolicy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            history: HistoryPolicy::default(),
        }
    }
}

fn default_max_tool_rounds() -> u32 {
    1
}

/// A destination for log output.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogSink {
    Console {
        #[serde(default)]
        level: Option<String>,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        level: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Base filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_sinks")]
    pub sinks: Vec<LogSink>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            sinks: default_sinks(),
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_sinks() -> Vec<LogSink> {
    vec![
        LogSink::File {
            path: PathBuf::from("mcp_client.log"),
            level: Some("debug".to_string()),
        },
        LogSink::Console {
            level: Some("info".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "qwen3:1.7b");
        assert_eq!(config.conversation.max_tool_rounds, 1);
        assert_eq!(config.conversation.history, HistoryPolicy::Full);
        assert_eq!(config.server.handshake_timeout, 30);
        assert_eq!(config.logging.sinks.len(), 2);
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"
llm:
  provider: openai
  model: gpt-4o-mini
  api_key_env: OPENAI_API_KEY
conversation:
  max_tool_rounds: 3
  history:
    mode: last_turns
    turns: 4
logging:
  level: info
  sinks:
    - type: console
"#
        )?;

        let config = AppConfig::load(Some(file.path()))?;
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(config.conversation.max_tool_rounds, 3);
        assert_eq!(config.conversation.history, HistoryPolicy::LastTurns { turns: 4 });
        assert_eq!(config.logging.sinks, vec![LogSink::Console { level: None }]);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = AppConfig::from_yaml("llm: [not, a, map]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
