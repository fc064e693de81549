//! # Domain Layer
//!
//! Core definitions, types, and traits that describe a tool-calling conversation.
//! Independent of the MCP SDK and of any particular model backend, serving as the
//! contract for the other layers.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod traits;
pub mod transcript;
pub mod types;
