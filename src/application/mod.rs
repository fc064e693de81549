//! # Application Layer
//!
//! Runs conversations: the turn state machine, the session that owns the
//! provider connection and transcript, and logging setup.

pub mod logging;
pub mod orchestrator;
pub mod session;

#[cfg(test)]
pub mod testing;
