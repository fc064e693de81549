//! # MCP Module
//!
//! Model Context Protocol client side.
//! Includes the stdio connection to a tool-provider process and the mapping
//! between MCP tool types and domain types.

pub mod client;
pub mod tools;

pub use client::{McpConnection, ServerEndpoint};
