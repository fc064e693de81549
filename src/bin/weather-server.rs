//! Weather MCP server over stdio.
//!
//! Stdout carries the protocol, so logs go to stderr.

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

use mcp_chat::server::WeatherServer;
use mcp_chat::server::nws::NwsClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let nws = NwsClient::new().context("Failed to create NWS client")?;
    tracing::info!("Starting weather MCP server");

    let service = WeatherServer::new(nws)
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to start server"))?;

    let reason = service.waiting().await?;
    tracing::info!(?reason, "Weather MCP server stopped");
    Ok(())
}
