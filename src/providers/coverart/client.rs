//! Cover Art Archive + MusicBrainz HTTP client
//!
//! IMPORTANT: MusicBrainz rate limits to 1 req/sec. Searches from all
//! concurrent tasks go through one gate that spaces them out.
//!
//! API: https://coverartarchive.org, https://musicbrainz.org/doc/MusicBrainz_API

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::dto;
use crate::providers::{AlbumArt, AlbumProvider, ProviderError, status_error};

/// Minimum spacing between MusicBrainz requests
const MUSICBRAINZ_INTERVAL: Duration = Duration::from_millis(1100);

/// Releases tried per track before giving up
const MAX_RELEASES: usize = 3;

/// Desired cover art size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverSize {
    /// 250px thumbnail
    Small,
    /// 500px thumbnail (default)
    #[default]
    Medium,
    /// 1200px thumbnail
    Large,
    /// Original full-size image
    Original,
}

impl CoverSize {
    fn suffix(self) -> &'static str {
        match self {
            CoverSize::Small => "-250",
            CoverSize::Medium => "-500",
            CoverSize::Large => "-1200",
            CoverSize::Original => "",
        }
    }
}

/// Album artwork provider backed by MusicBrainz and the Cover Art Archive
pub struct CoverArtProvider {
    http_client: reqwest::Client,
    musicbrainz_url: String,
    coverart_url: String,
    size: CoverSize,
    /// Earliest moment the next MusicBrainz request may go out
    next_search: Mutex<Instant>,
}

impl CoverArtProvider {
    pub const NAME: &'static str = "coverartarchive";

    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            musicbrainz_url: "https://musicbrainz.org/ws/2".to_string(),
            coverart_url: "https://coverartarchive.org".to_string(),
            size: CoverSize::default(),
            next_search: Mutex::new(Instant::now()),
        }
    }

    pub fn with_size(mut self, size: CoverSize) -> Self {
        self.size = size;
        self
    }

    /// Create a client for testing with custom base URLs
    #[cfg(test)]
    pub fn with_base_urls(musicbrainz_url: impl Into<String>, coverart_url: impl Into<String>) -> Self {
        Self {
            musicbrainz_url: musicbrainz_url.into(),
            coverart_url: coverart_url.into(),
            ..Self::new(reqwest::Client::new())
        }
    }

    fn search_url(&self, title: &str, artist: &str) -> String {
        let mut query = format!("recording:\"{}\"", escape_lucene(title));
        if !artist.trim().is_empty() {
            query.push_str(&format!(" AND artist:\"{}\"", escape_lucene(artist)));
        }
        format!(
            "{}/recording?query={}&fmt=json&limit=5",
            self.musicbrainz_url,
            urlencoding::encode(&query)
        )
    }

    fn front_cover_url(&self, release_id: &str) -> String {
        format!(
            "{}/release/{}/front{}",
            self.coverart_url,
            release_id,
            self.size.suffix()
        )
    }

    /// Wait for this task's MusicBrainz slot.
    async fn throttle(&self) {
        let mut next = self.next_search.lock().await;
        let now = Instant::now();
        if *next > now {
            tokio::time::sleep_until(*next).await;
        }
        *next = Instant::now() + MUSICBRAINZ_INTERVAL;
    }

    async fn search_releases(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.throttle().await;

        let response = self
            .http_client
            .get(self.search_url(title, artist))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response
            .json::<dto::RecordingSearchResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(body.candidate_releases(MAX_RELEASES))
    }

    /// Download an image from a URL
    async fn download_image(&self, url: &str) -> Result<AlbumArt, ProviderError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        if !mime_type.starts_with("image/") {
            return Err(ProviderError::InvalidResponse(format!(
                "expected an image, got {mime_type}"
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?
            .to_vec();

        Ok(AlbumArt {
            data,
            mime_type,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl AlbumProvider for CoverArtProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, title: &str, artist: &str) -> Result<AlbumArt, ProviderError> {
        let releases = self.search_releases(title, artist).await?;
        for release_id in releases {
            match self.download_image(&self.front_cover_url(&release_id)).await {
                Ok(art) => return Ok(art),
                // Release exists but has no front image; try the next one
                Err(ProviderError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ProviderError::NotFound)
    }
}

/// Escape Lucene special characters inside a quoted phrase.
fn escape_lucene(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
