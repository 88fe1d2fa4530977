//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `fetch`: lyric and album art batches
//! - `providers`: provider listing and config bootstrap

mod fetch;
mod providers;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub use fetch::{FetchArgs, cmd_fetch};
pub use providers::{cmd_init_config, cmd_providers};

use crate::config;

/// Music Fetcher CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "MUSIC_FETCHER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch lyrics and/or album art for a music directory
    Fetch {
        /// Directory to scan for audio files
        path: PathBuf,
        /// Fetch lyrics (the default when neither --lyrics nor --album is given)
        #[arg(long)]
        lyrics: bool,
        /// Fetch album art
        #[arg(long)]
        album: bool,
        /// Maximum tracks processed at once
        #[arg(short, long)]
        concurrency: Option<usize>,
        /// Leave tracks alone that already have a lyric file
        #[arg(long, overrides_with = "no_skip_existing")]
        skip_existing: bool,
        /// Fetch lyrics even where a lyric file exists (overrides the config)
        #[arg(long, overrides_with = "skip_existing")]
        no_skip_existing: bool,
        /// Text encoding for lyric files (e.g. utf-8, gbk, utf-16le)
        #[arg(long)]
        encoding: Option<String>,
    },
    /// Show the configured providers in the order they are tried
    Providers,
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let load = || match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Fetch {
            path,
            lyrics,
            album,
            concurrency,
            skip_existing,
            no_skip_existing,
            encoding,
        } => {
            let rt = Runtime::new()?;
            let args = FetchArgs {
                lyrics: *lyrics,
                album: *album,
                concurrency: *concurrency,
                skip_existing: flag_override(*skip_existing, *no_skip_existing),
                encoding: encoding.clone(),
            };
            cmd_fetch(&rt, path, args, load())
        }
        Commands::Providers => cmd_providers(&load()),
        Commands::InitConfig { force } => cmd_init_config(*force),
    }
}

/// `Some` when one of a `--flag` / `--no-flag` pair was given.
fn flag_override(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
