//! Music Fetcher - batch lyric and album art downloader.
//!
//! Scans a music directory, reads each track's tags, and asks a prioritized
//! chain of online providers for lyrics (or one provider for album art),
//! writing the results next to the audio files.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod providers;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log targets used by the batch engine and providers, alongside module paths.
const DEFAULT_LOG_DIRECTIVES: &str = "music_fetcher=info,batch=info,providers=info";

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_LOG_DIRECTIVES)
}

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    // Per-track failures are reported in the summary; only batch-level
    // errors (bad config, nothing to process) reach here
    match cli::run_command(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let batch_fatal = e
                .downcast_ref::<error::Error>()
                .is_some_and(error::Error::is_batch_fatal);
            if batch_fatal {
                eprintln!("Batch aborted: {e:#}");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
