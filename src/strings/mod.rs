//! # Strings Module
//!
//! Centralizes user-facing strings printed by the interactive client.

pub mod messages;
