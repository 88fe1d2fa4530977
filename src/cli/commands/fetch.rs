//! Lyric and album art fetch command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::batch::{LyricOptions, Orchestrator, PipelineReport};
use crate::config::{Config, FetchConfig};
use crate::error::Error;
use crate::metadata::LoftyTagLoader;
use crate::providers::{self, resolve_chain};

/// Command-line overrides for the `[fetch]` config section.
#[derive(Debug, Default)]
pub struct FetchArgs {
    pub lyrics: bool,
    pub album: bool,
    pub concurrency: Option<usize>,
    /// `None` keeps the config value
    pub skip_existing: Option<bool>,
    pub encoding: Option<String>,
}

/// Fetch lyrics and/or album art for every track under `path`.
///
/// Without `--lyrics` or `--album` only lyrics are fetched.
pub fn cmd_fetch(rt: &Runtime, path: &Path, args: FetchArgs, config: Config) -> anyhow::Result<()> {
    let Config { fetch, providers: provider_config } = config;
    let concurrency = args.concurrency.unwrap_or(fetch.concurrency);
    let want_lyrics = args.lyrics || !args.album;

    let client = providers::http_client(Duration::from_secs(
        provider_config.request_timeout_secs,
    ))?;

    let chain = resolve_chain(
        &provider_config.lyrics,
        &providers::lyrics_registry(&client),
    );
    let options = lyric_options(&args, &fetch);

    let album_provider = if args.album {
        let name = &provider_config.album.name;
        let provider = providers::album_registry(&client, provider_config.album.size)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::config(format!("unknown album provider: {name}")))?;
        Some(provider)
    } else {
        None
    };

    let orchestrator = Orchestrator::new(
        Arc::new(LoftyTagLoader),
        concurrency,
        fetch.audio_extensions,
    )?;

    rt.block_on(async move {
        if want_lyrics {
            println!("Fetching lyrics in {:?} ({} at a time)", path, concurrency);
            let report = orchestrator.run_lyrics(path, chain, &options).await?;
            print_report("Lyrics", &report);
        }

        if let Some(provider) = album_provider {
            println!("Fetching album art in {:?} from {}", path, provider.name());
            let report = orchestrator.run_albums(path, provider).await?;
            print_report("Album art", &report);
        }

        Ok::<(), anyhow::Error>(())
    })
}

/// Lyric settings from the config with command-line overrides applied.
fn lyric_options(args: &FetchArgs, fetch: &FetchConfig) -> LyricOptions {
    LyricOptions {
        skip_existing: args.skip_existing.unwrap_or(fetch.skip_existing),
        encoding: args.encoding.clone().unwrap_or_else(|| fetch.encoding.clone()),
        extension: fetch.lyric_extension.clone(),
        fault_policy: fetch.fault_policy,
    }
}

fn print_report(label: &str, report: &PipelineReport) {
    for item in &report.items {
        if item.success != Some(true) {
            println!("  ✗ {}", item.display_name());
        }
    }

    let outcome = &report.outcome;
    println!(
        "{}: {} succeeded, {} failed, {} skipped ({} attempted)",
        label, outcome.succeeded, outcome.failed, outcome.skipped, outcome.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let fetch = FetchConfig {
            skip_existing: true,
            encoding: "gbk".to_string(),
            ..Default::default()
        };

        let options = lyric_options(&FetchArgs::default(), &fetch);
        assert!(options.skip_existing);
        assert_eq!(options.encoding, "gbk");

        let args = FetchArgs {
            skip_existing: Some(false),
            encoding: Some("utf-16le".to_string()),
            ..Default::default()
        };
        let options = lyric_options(&args, &fetch);
        assert!(!options.skip_existing);
        assert_eq!(options.encoding, "utf-16le");
    }
}
