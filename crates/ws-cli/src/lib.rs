//! Work-status tracker CLI library.
//!
//! This crate provides the CLI interface for the work-status tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{AgentsAction, Cli, Commands};
pub use config::Config;
