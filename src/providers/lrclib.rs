//! LRCLIB HTTP client
//!
//! Free synced-lyrics database, no API key required.
//! API: https://lrclib.net/docs

use async_trait::async_trait;
use serde::Deserialize;

use super::{LyricResult, LyricsProvider, ProviderError, status_error};

/// `/api/get` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LrcLibResponse {
    pub id: Option<u64>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    /// Seconds
    pub duration: Option<f64>,
    #[serde(default)]
    pub instrumental: bool,
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}

impl LrcLibResponse {
    /// Synced lyrics win over plain; an instrumental flag wins over both.
    pub fn into_result(self) -> Result<LyricResult, ProviderError> {
        if self.instrumental {
            return Ok(LyricResult::Instrumental);
        }
        [self.synced_lyrics, self.plain_lyrics]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .map(LyricResult::Lyrics)
            .ok_or(ProviderError::NotFound)
    }
}

/// LRCLIB lyrics provider
pub struct LrcLibProvider {
    http_client: reqwest::Client,
    base_url: String,
}

impl LrcLibProvider {
    pub const NAME: &'static str = "lrclib";

    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url: "https://lrclib.net/api".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn request_url(&self, title: &str, artist: &str, duration_ms: Option<u64>) -> String {
        let mut url = format!(
            "{}/get?track_name={}&artist_name={}",
            self.base_url,
            urlencoding::encode(title),
            urlencoding::encode(artist)
        );
        if let Some(ms) = duration_ms {
            // LRCLIB matches on whole seconds, within a couple of seconds
            url.push_str(&format!("&duration={}", (ms + 500) / 1000));
        }
        url
    }
}

#[async_trait]
impl LyricsProvider for LrcLibProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(
        &self,
        title: &str,
        artist: &str,
        duration_ms: Option<u64>,
    ) -> Result<LyricResult, ProviderError> {
        let url = self.request_url(title, artist, duration_ms);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response
            .json::<LrcLibResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        tracing::debug!(
            target: "providers",
            id = ?body.id,
            track = ?body.track_name,
            artist = ?body.artist_name,
            duration = ?body.duration,
            "LRCLIB match"
        );
        body.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LrcLibResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_prefers_synced_lyrics() {
        let response = parse(
            r#"{"id":1,"trackName":"Song","artistName":"Artist","duration":201.0,
                "instrumental":false,"plainLyrics":"plain","syncedLyrics":"[00:01.00]synced"}"#,
        );
        assert_eq!(
            response.into_result().unwrap(),
            LyricResult::Lyrics("[00:01.00]synced".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_plain() {
        let response = parse(r#"{"instrumental":false,"plainLyrics":"plain","syncedLyrics":null}"#);
        assert_eq!(
            response.into_result().unwrap(),
            LyricResult::Lyrics("plain".to_string())
        );
    }

    #[test]
    fn test_instrumental_flag() {
        let response = parse(r#"{"instrumental":true,"plainLyrics":null,"syncedLyrics":null}"#);
        assert_eq!(response.into_result().unwrap(), LyricResult::Instrumental);
    }

    #[test]
    fn test_empty_lyrics_are_not_found() {
        let response = parse(r#"{"instrumental":false,"plainLyrics":"  ","syncedLyrics":""}"#);
        assert!(matches!(response.into_result(), Err(ProviderError::NotFound)));
    }

    #[test]
    fn test_request_url() {
        let client = LrcLibProvider::with_base_url("http://localhost:9000/api");
        let url = client.request_url("Hey Jude", "The Beatles", Some(431_333));
        assert_eq!(
            url,
            "http://localhost:9000/api/get?track_name=Hey%20Jude&artist_name=The%20Beatles&duration=431"
        );
        let url = client.request_url("A", "B", None);
        assert!(!url.contains("duration"));
    }

    #[test]
    fn test_client_creation() {
        let client = LrcLibProvider::new(reqwest::Client::new());
        assert_eq!(client.base_url, "https://lrclib.net/api");
        assert_eq!(LyricsProvider::name(&client), "lrclib");
    }
}
