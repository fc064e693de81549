//! # Weather Tool Server
//!
//! MCP server exposing weather tools over stdio. Built as the `weather-server`
//! binary and used as the default tool provider for the chat client.

pub mod nws;
pub mod weather;

pub use weather::WeatherServer;
