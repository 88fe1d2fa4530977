//! Command-line interface for music-fetcher.
//!
//! This module provides CLI commands for fetching lyrics and album art
//! for a music directory and for inspecting the provider configuration.

mod commands;

pub use commands::{Cli, Commands, run_command};
