//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (`ToolProvider`, `ChatModel`).

pub mod llm;
pub mod mcp;
