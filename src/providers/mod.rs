//! Remote lyric and artwork providers.
//!
//! # Architecture
//!
//! - **Traits** ([`LyricsProvider`], [`AlbumProvider`]) - what the batch
//!   engine talks to. It never knows which concrete provider it holds.
//! - **Chain** (`chain.rs`) - turns configured names + priorities into an
//!   ordered list of registered providers.
//! - **Clients** (`lrclib.rs`, `lyricsovh.rs`, `coverart/`) - HTTP clients
//!   for the real services.
//!
//! Providers report failures as [`ProviderError`]. Only
//! [`ProviderError::NotFound`] means "no result for this query"; every
//! other variant is a fault. [`Lookup`] is that classification as a tag.

pub mod chain;
pub mod coverart;
pub mod lrclib;
pub mod lyricsovh;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use chain::{DISABLED_PRIORITY, ProviderDescriptor, ProviderRegistry, resolve_chain};
pub use coverart::{CoverArtProvider, CoverSize};
pub use lrclib::LrcLibProvider;
pub use lyricsovh::LyricsOvhProvider;

/// User agent sent to every service
pub(crate) const USER_AGENT: &str = concat!(
    "MusicFetcher/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/music-fetcher)"
);

/// Errors a provider can report for one request
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("No result found")]
    NotFound,

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Classified outcome of one provider attempt.
#[derive(Debug, Clone)]
pub enum Lookup<T> {
    Found(T),
    /// The provider answered, and it has nothing for this track
    NotFound,
    /// Transport, protocol or parse failure
    Fault(ProviderError),
}

impl<T> From<Result<T, ProviderError>> for Lookup<T> {
    fn from(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(value) => Self::Found(value),
            Err(ProviderError::NotFound) => Self::NotFound,
            Err(e) => Self::Fault(e),
        }
    }
}

/// Lyrics for one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricResult {
    /// LRC or plain text, UTF-8
    Lyrics(String),
    /// The track is known to have no lyrics
    Instrumental,
}

/// Downloaded album artwork
#[derive(Debug, Clone)]
pub struct AlbumArt {
    /// Image bytes (JPEG or PNG); may be empty
    pub data: Vec<u8>,
    /// MIME type reported by the server
    pub mime_type: String,
    /// Where it was downloaded from
    pub url: String,
}

/// A lyric source.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Name used to match configuration entries.
    fn name(&self) -> &str;

    /// Fetch lyrics for a track. `duration_ms` helps disambiguate versions.
    async fn fetch(
        &self,
        title: &str,
        artist: &str,
        duration_ms: Option<u64>,
    ) -> Result<LyricResult, ProviderError>;
}

/// An album artwork source.
#[async_trait]
pub trait AlbumProvider: Send + Sync {
    /// Name used to match configuration entries.
    fn name(&self) -> &str;

    /// Fetch the front cover for the album a track belongs to.
    async fn fetch(&self, title: &str, artist: &str) -> Result<AlbumArt, ProviderError>;
}

impl chain::Named for dyn LyricsProvider {
    fn name(&self) -> &str {
        LyricsProvider::name(self)
    }
}

impl chain::Named for dyn AlbumProvider {
    fn name(&self) -> &str {
        AlbumProvider::name(self)
    }
}

/// Build the shared HTTP client used by all providers.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Every lyric provider this build knows about, keyed by name.
pub fn lyrics_registry(client: &reqwest::Client) -> ProviderRegistry<dyn LyricsProvider> {
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(LrcLibProvider::new(client.clone())) as Arc<dyn LyricsProvider>);
    registry.register(Arc::new(LyricsOvhProvider::new(client.clone())) as Arc<dyn LyricsProvider>);
    registry
}

/// Every album provider this build knows about, keyed by name.
pub fn album_registry(
    client: &reqwest::Client,
    cover_size: CoverSize,
) -> ProviderRegistry<dyn AlbumProvider> {
    let mut registry = ProviderRegistry::new();
    registry.register(
        Arc::new(CoverArtProvider::new(client.clone()).with_size(cover_size)) as Arc<dyn AlbumProvider>,
    );
    registry
}

/// Map a non-success HTTP status to an error, shared by the clients.
pub(crate) fn status_error(status: reqwest::StatusCode) -> ProviderError {
    match status {
        reqwest::StatusCode::NOT_FOUND => ProviderError::NotFound,
        reqwest::StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        _ => ProviderError::Network(format!(
            "HTTP {}: {}",
            status,
            status.canonical_reason().unwrap_or("Unknown")
        )),
    }
}
