//! # Main Entry Point
//!
//! Loads configuration, installs logging, starts a session against the MCP
//! server named on the command line and hands it to the REPL.

use anyhow::{Context, Result};
use clap::Parser;

use mcp_chat::application::logging::Logging;
use mcp_chat::application::session::Session;
use mcp_chat::domain::config::AppConfig;
use mcp_chat::interface::cli::Cli;
use mcp_chat::interface::repl;
use mcp_chat::strings::messages;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    // 2. Logging Setup
    let _log_guard = Logging::from_config(&config.logging)
        .init()
        .context("Failed to initialize logging")?;

    tracing::info!(server = %cli.server.display(), "Starting mcp-chat...");

    // 3. Session
    let mut session = match Session::start(&cli.server, &config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", messages::startup_failed(&e.to_string()));
            return Err(e.into());
        }
    };
    println!("{}", messages::connected(&session.catalog().names()));

    // 4. Query Loop
    let result = repl::run(&mut session).await;

    session.close().await;
    tracing::info!("Session closed");
    result.map_err(Into::into)
}
