//! MCP client over child-process stdio
//!
//! `McpConnection` launches the tool-provider process, performs the initialize
//! handshake through the `rmcp` SDK and implements `ToolProvider` on top of the
//! running service. The child process lives exactly as long as the connection:
//! `close()` cancels the service and reaps it, and dropping the connection does
//! the same.

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, PaginatedRequestParam};
use rmcp::service::{Peer, RunningService};
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::{Mutex, RwLock};
use tracing::{Instrument, Span};

use crate::domain::config::ServerConfig;
use crate::domain::errors::{Error, Result};
use crate::domain::traits::ToolProvider;
use crate::domain::types::ToolDescriptor;
use crate::infrastructure::mcp::tools::{descriptor_from_tool, is_error, render_result};

/// How to launch a tool-provider process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    /// The server script or executable named on the command line
    pub path: PathBuf,
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl ServerEndpoint {
    /// `.py` scripts run under the configured Python, `.js` under Node,
    /// anything else is executed directly.
    pub fn resolve(path: &Path, config: &ServerConfig) -> Self {
        let script = path.as_os_str().to_owned();
        let (program, args) = match path.extension().and_then(|e| e.to_str()) {
            Some("py") => (OsString::from(&config.python), vec![script]),
            Some("js") => (OsString::from(&config.node), vec![script]),
            _ => (script, Vec::new()),
        };

        Self {
            path: path.to_path_buf(),
            program,
            args,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

type ClientService = RunningService<RoleClient, ()>;

/// A live session with one MCP server process
pub struct McpConnection {
    /// `None` once closed
    service: Mutex<Option<ClientService>>,
    /// Names seen in the last `tools/list`
    advertised: RwLock<HashSet<String>>,
    request_timeout: Duration,
    span: Span,
}

impl McpConnection {
    /// Launch the server process and complete the MCP handshake
    ///
    /// # Errors
    /// Returns `Error::Connection` if:
    /// - The endpoint path does not exist
    /// - The process cannot be spawned
    /// - The handshake fails or does not finish within `handshake_timeout`
    pub async fn connect(endpoint: ServerEndpoint, config: &ServerConfig) -> Result<Self> {
        let span = tracing::info_span!("mcp", server = %endpoint.path.display());
        Self::connect_with_span(endpoint, config, span).await
    }

    /// Same as [`connect`](Self::connect), logging under the given span
    pub async fn connect_with_span(
        endpoint: ServerEndpoint,
        config: &ServerConfig,
        span: Span,
    ) -> Result<Self> {
        let handshake_timeout = Duration::from_secs(config.handshake_timeout);
        let service = open_service(&endpoint, handshake_timeout)
            .instrument(span.clone())
            .await;

        match service {
            Ok(service) => {
                span.in_scope(|| {
                    let server = service
                        .peer()
                        .peer_info()
                        .map(|info| format!("{} {}", info.server_info.name, info.server_info.version))
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info!(%server, command = %endpoint, "Connected to MCP server");
                });
                Ok(Self {
                    service: Mutex::new(Some(service)),
                    advertised: RwLock::new(HashSet::new()),
                    request_timeout: Duration::from_secs(config.request_timeout),
                    span,
                })
            }
            Err(e) => {
                span.in_scope(|| tracing::error!(command = %endpoint, error = %e, "Failed to connect to MCP server"));
                Err(e)
            }
        }
    }

    pub async fn is_open(&self) -> bool {
        self.service.lock().await.is_some()
    }

    /// Clone the peer handle so requests do not hold the lock
    async fn peer(&self) -> Option<Peer<RoleClient>> {
        self.service
            .lock()
            .await
            .as_ref()
            .map(|service| service.peer().clone())
    }

    async fn fetch_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let peer = self
            .peer()
            .await
            .ok_or_else(|| Error::ProviderQuery("connection is closed".to_string()))?;

        tracing::info!("Fetching MCP tools...");
        let mut descriptors = Vec::new();
        let mut cursor = None;
        loop {
            let page = tokio::time::timeout(
                self.request_timeout,
                peer.list_tools(Some(PaginatedRequestParam { cursor })),
            )
            .await
            .map_err(|_| Error::ProviderQuery("tools/list timed out".to_string()))?
            .map_err(|e| Error::ProviderQuery(format!("tools/list failed: {}", e)))?;

            descriptors.extend(page.tools.into_iter().map(descriptor_from_tool));
            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        *self.advertised.write().await = descriptors.iter().map(|d| d.name.clone()).collect();
        tracing::info!(
            tools = ?descriptors.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            "MCP tools fetched"
        );
        Ok(descriptors)
    }

    async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> Result<String> {
        if !self.advertised.read().await.contains(name) {
            return Err(Error::UnknownTool(name.to_string()));
        }

        let peer = self
            .peer()
            .await
            .ok_or_else(|| Error::tool_execution(name, "connection is closed"))?;

        let shown = Value::Object(arguments.clone());
        tracing::info!(tool = name, arguments = %shown, "Calling tool");
        let result = tokio::time::timeout(
            self.request_timeout,
            peer.call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments),
            }),
        )
        .await
        .map_err(|_| Error::tool_execution(name, "tools/call timed out"))?
        .map_err(|e| Error::tool_execution(name, format!("tools/call failed: {}", e)))?;

        let output = render_result(&result);
        if is_error(&result) {
            return Err(Error::tool_execution(name, output));
        }

        tracing::info!(tool = name, output = %output, "Tool call output");
        Ok(output)
    }
}

async fn open_service(endpoint: &ServerEndpoint, handshake_timeout: Duration) -> Result<ClientService> {
    if !endpoint.path.exists() {
        return Err(Error::Connection(format!(
            "server path does not exist: {}",
            endpoint.path.display()
        )));
    }

    let transport = TokioChildProcess::new(endpoint.command())
        .map_err(|e| Error::Connection(format!("failed to launch `{}`: {}", endpoint, e)))?;

    tokio::time::timeout(handshake_timeout, ().serve(transport))
        .await
        .map_err(|_| {
            Error::Connection(format!(
                "handshake with `{}` timed out after {:?}",
                endpoint, handshake_timeout
            ))
        })?
        .map_err(|e| Error::Connection(format!("handshake with `{}` failed: {}", endpoint, e)))
}

#[async_trait]
impl ToolProvider for McpConnection {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let result = self.fetch_tools().instrument(self.span.clone()).await;
        if let Err(e) = &result {
            self.span.in_scope(|| tracing::error!(error = %e, "Failed to fetch MCP tools"));
        }
        result
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<String> {
        let result = self.invoke(name, arguments).instrument(self.span.clone()).await;
        if let Err(e) = &result {
            self.span.in_scope(|| tracing::error!(tool = name, error = %e, "Failed to call tool"));
        }
        result
    }

    async fn close(&self) {
        let Some(service) = self.service.lock().await.take() else {
            return;
        };

        async {
            tracing::info!("Cleaning up MCP client resources...");
            match service.cancel().await {
                Ok(reason) => tracing::debug!(?reason, "MCP service stopped"),
                Err(e) => tracing::warn!(error = %e, "Failed to clean up MCP client"),
            }
        }
        .instrument(self.span.clone())
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_resolution() {
        let config = ServerConfig::default();

        let py = ServerEndpoint::resolve(Path::new("server/weather.py"), &config);
        assert_eq!(py.program, "python");
        assert_eq!(py.args, vec![OsString::from("server/weather.py")]);

        let js = ServerEndpoint::resolve(Path::new("build/index.js"), &config);
        assert_eq!(js.program, "node");

        let bin = ServerEndpoint::resolve(Path::new("/usr/local/bin/weather-server"), &config);
        assert_eq!(bin.program, "/usr/local/bin/weather-server");
        assert!(bin.args.is_empty());
        assert_eq!(bin.to_string(), "/usr/local/bin/weather-server");
    }

    #[test]
    fn test_interpreter_override() {
        let config = ServerConfig {
            python: "python3".to_string(),
            ..ServerConfig::default()
        };
        let py = ServerEndpoint::resolve(Path::new("weather.py"), &config);
        assert_eq!(py.to_string(), "python3 weather.py");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_kept_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/srv/m\xe9t\xe9o-server");
        let bin = ServerEndpoint::resolve(Path::new(raw), &ServerConfig::default());
        assert_eq!(bin.program.as_bytes(), raw.as_bytes());

        let raw_py = OsStr::from_bytes(b"/srv/m\xe9t\xe9o.py");
        let py = ServerEndpoint::resolve(Path::new(raw_py), &ServerConfig::default());
        assert_eq!(py.args[0].as_bytes(), raw_py.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_path_is_connection_error() {
        let endpoint = ServerEndpoint::resolve(Path::new("/no/such/server.py"), &ServerConfig::default());
        let result = McpConnection::connect(endpoint, &ServerConfig::default()).await;
        assert!(matches!(result, Err(Error::Connection(_))));
    }
}
