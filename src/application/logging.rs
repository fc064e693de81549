//! # Logging Setup
//!
//! Installs the global `tracing` subscriber with one fmt layer per configured
//! sink (Console, File). Each sink carries its own level; `RUST_LOG`, when set,
//! replaces the base filter.

use std::path::Path;
use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::domain::config::{LogSink, LoggingConfig};
use crate::domain::errors::{Error, Result};

/// Noisy dependencies kept at `warn` unless `RUST_LOG` says otherwise
const QUIET_TARGETS: &str = "hyper=warn,reqwest=warn,rmcp=info";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the file writers flushing. Drop it only at exit.
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Logging setup builder
pub struct Logging {
    level: String,
    sinks: Vec<LogSink>,
}

impl Logging {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            sinks: config.sinks.clone(),
        }
    }

    /// Install the subscriber. Fails if one is already set.
    pub fn init(self) -> Result<LogGuard> {
        let base = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(format!("{},{}", self.level, QUIET_TARGETS))
                .map_err(|e| Error::Config(format!("Invalid log level '{}': {e}", self.level)))?,
        };

        let mut guards = Vec::new();
        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            layers.push(build_layer(sink, &mut guards)?);
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(base)
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to install logger: {e}")))?;

        Ok(LogGuard { _guards: guards })
    }
}

fn build_layer(sink: &LogSink, guards: &mut Vec<WorkerGuard>) -> Result<BoxedLayer> {
    match sink {
        LogSink::Console { level } => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(sink_level(level.as_deref())?);
            Ok(Box::new(layer))
        }
        LogSink::File { path, level } => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::Config(format!("Invalid log file path: {}", path.display())))?;
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::Config(format!("Failed to create {}: {e}", dir.display())))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339())
                .with_filter(sink_level(level.as_deref())?);
            Ok(Box::new(layer))
        }
    }
}

fn sink_level(level: Option<&str>) -> Result<LevelFilter> {
    match level {
        None => Ok(LevelFilter::TRACE),
        Some(level) => LevelFilter::from_str(level)
            .map_err(|_| Error::Config(format!("Invalid sink level '{level}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_levels() {
        assert_eq!(sink_level(Some("info")).unwrap(), LevelFilter::INFO);
        assert_eq!(sink_level(Some("DEBUG")).unwrap(), LevelFilter::DEBUG);
        assert_eq!(sink_level(None).unwrap(), LevelFilter::TRACE);
        assert!(matches!(sink_level(Some("chatty")), Err(Error::Config(_))));
    }

    #[test]
    fn test_file_sink_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("mcp_client.log");
        let mut guards = Vec::new();

        build_layer(
            &LogSink::File {
                path: path.clone(),
                level: Some("debug".to_string()),
            },
            &mut guards,
        )
        .unwrap();

        assert!(path.parent().unwrap().is_dir());
        assert_eq!(guards.len(), 1);
    }
}
