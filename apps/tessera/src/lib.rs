//! # Tessera
//!
//! Library half of the `tessera` binary: argument parsing, command
//! implementations and configuration loading. Kept separate from `main.rs`
//! so integration tests can drive commands directly.

pub mod cli;
pub mod config;
