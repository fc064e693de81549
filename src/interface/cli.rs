//! # Command Line
//!
//! Arguments for the chat client. Flags override the matching config-file values.

use clap::Parser;
use std::path::PathBuf;

use crate::domain::config::AppConfig;

/// Chat with a language model that can call tools from an MCP server.
#[derive(Debug, Parser)]
#[command(name = "mcp-chat", version)]
pub struct Cli {
    /// Path to the MCP server (.py, .js or an executable)
    #[arg(value_name = "SERVER")]
    pub server: PathBuf,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Model backend: ollama, openai or groq
    #[arg(long)]
    pub provider: Option<String>,

    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of the model backend
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Base log filter, e.g. "info" or "mcp_chat=debug"
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Flags given on the command line win over the file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.llm.endpoint = Some(endpoint.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_is_required() {
        assert!(Cli::try_parse_from(["mcp-chat"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "mcp-chat",
            "server/weather.py",
            "--provider",
            "groq",
            "-m",
            "llama-3.3-70b-versatile",
            "--log-level",
            "warn",
        ])
        .unwrap();
        assert_eq!(cli.server, PathBuf::from("server/weather.py"));

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.endpoint, None);
        assert_eq!(config.logging.level, "warn");
    }
}
