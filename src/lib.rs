//! # mcp-chat
//!
//! Minimal MCP chat client. Connects to a tool-provider process over stdio,
//! discovers its tools and lets a chat model call them while answering queries.
//!
//! - Domain: Configuration, Types, Errors, Catalog, Transcript
//! - Infrastructure: MCP connection, LLM providers
//! - Application: Orchestrator, Session, Logging
//! - Interface: CLI arguments, REPL
//! - Server: the bundled weather MCP server

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod server;
pub mod strings;
