//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-fetcher\config.toml
//! - macOS: ~/Library/Application Support/music-fetcher/config.toml
//! - Linux: ~/.config/music-fetcher/config.toml
//!
//! The config file is human-readable and editable. Command-line flags
//! override whatever is loaded here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::providers::{CoverArtProvider, CoverSize, LrcLibProvider, LyricsOvhProvider, ProviderDescriptor};
use crate::scanner::DEFAULT_EXTENSIONS;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Batch settings
    pub fetch: FetchConfig,

    /// Provider selection and ordering
    pub providers: ProvidersConfig,
}

/// What to do when a provider fails with something other than "not found"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Mark the track failed and stop trying providers
    #[default]
    Abort,
    /// Treat it like "not found" and move on to the next provider
    Continue,
}

/// Batch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum tracks processed at once
    pub concurrency: usize,

    /// Leave tracks alone that already have a lyric file
    pub skip_existing: bool,

    /// Text encoding of written lyric files (WHATWG label)
    pub encoding: String,

    /// Extension of lyric files
    pub lyric_extension: String,

    /// Audio file extensions to scan for
    pub audio_extensions: Vec<String>,

    /// Reaction to provider faults
    pub fault_policy: FaultPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            skip_existing: false,
            encoding: "utf-8".to_string(),
            lyric_extension: "lrc".to_string(),
            audio_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            fault_policy: FaultPolicy::default(),
        }
    }
}

/// Provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Per-request timeout for every provider call
    pub request_timeout_secs: u64,

    /// Lyric providers, tried by ascending priority (-1 disables)
    pub lyrics: Vec<ProviderDescriptor>,

    /// The artwork source
    pub album: AlbumProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            lyrics: vec![
                ProviderDescriptor::new(LrcLibProvider::NAME, 1),
                ProviderDescriptor::new(LyricsOvhProvider::NAME, 2),
            ],
            album: AlbumProviderConfig::default(),
        }
    }
}

/// Artwork provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumProviderConfig {
    /// Registered name of the artwork provider
    pub name: String,

    /// Image size to download: small, medium, large or original
    pub size: CoverSize,
}

impl Default for AlbumProviderConfig {
    fn default() -> Self {
        Self {
            name: CoverArtProvider::NAME.to_string(),
            size: CoverSize::default(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-fetcher"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, with the same fallbacks as [`load`].
pub fn load_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist. Returns the path written.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &dir.join("config.toml"))
}

/// Save configuration to a specific file
pub fn save_to(config: &Config, path: &std::path::Path) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(path.to_path_buf())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
