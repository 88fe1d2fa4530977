//! Provider listing and config bootstrap commands.

use std::time::Duration;

use crate::config::{self, Config};
use crate::providers::{self, resolve_chain};

/// Print the lyric chain in the order it will be tried, then the album provider.
pub fn cmd_providers(config: &Config) -> anyhow::Result<()> {
    let client = providers::http_client(Duration::from_secs(
        config.providers.request_timeout_secs,
    ))?;
    let registry = providers::lyrics_registry(&client);
    let chain = resolve_chain(&config.providers.lyrics, &registry);

    println!("Lyric providers (in order):");
    if chain.is_empty() {
        println!("  (none enabled)");
    }
    for (i, provider) in chain.iter().enumerate() {
        println!("  {}. {}", i + 1, provider.name());
    }

    for descriptor in &config.providers.lyrics {
        if descriptor.is_disabled() {
            println!("  - {} (disabled)", descriptor.name);
        } else if registry.get(&descriptor.name).is_none() {
            println!("  - {} (unknown)", descriptor.name);
        }
    }
    println!("Available: {}", registry.names().join(", "));

    let album = &config.providers.album.name;
    let known = providers::album_registry(&client, config.providers.album.size)
        .get(album)
        .is_some();
    println!(
        "Album provider: {}{}",
        album,
        if known { "" } else { " (unknown)" }
    );
    Ok(())
}

/// Write the default config file, refusing to overwrite an existing one.
pub fn cmd_init_config(force: bool) -> anyhow::Result<()> {
    if let Some(path) = config::config_path().filter(|p| p.exists()) {
        if !force {
            println!("Config already exists at {:?} (use --force to overwrite)", path);
            return Ok(());
        }
    }

    let path = config::save(&Config::default())?;
    println!("Wrote default config to {:?}", path);
    Ok(())
}
