//! # Interface Layer
//!
//! Command-line arguments and the interactive query loop.

pub mod cli;
pub mod repl;
