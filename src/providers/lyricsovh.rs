//! lyrics.ovh HTTP client
//!
//! Plain-text lyrics only, no API key required.
//! API: https://lyricsovh.docs.apiary.io

use async_trait::async_trait;
use serde::Deserialize;

use super::{LyricResult, LyricsProvider, ProviderError, status_error};

#[derive(Debug, Clone, Deserialize)]
struct LyricsOvhResponse {
    lyrics: Option<String>,
    error: Option<String>,
}

/// lyrics.ovh lyrics provider
pub struct LyricsOvhProvider {
    http_client: reqwest::Client,
    base_url: String,
}

impl LyricsOvhProvider {
    pub const NAME: &'static str = "lyricsovh";

    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url: "https://api.lyrics.ovh/v1".to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn request_url(&self, title: &str, artist: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        )
    }
}

fn to_result(response: LyricsOvhResponse) -> Result<LyricResult, ProviderError> {
    match (response.lyrics, response.error) {
        (Some(text), _) if !text.trim().is_empty() => {
            // The service separates lines with \r\n and pads with blank lines
            Ok(LyricResult::Lyrics(text.replace("\r\n", "\n").trim().to_string()))
        }
        (_, Some(error)) if !error.to_lowercase().contains("no lyrics") => {
            Err(ProviderError::Api(error))
        }
        _ => Err(ProviderError::NotFound),
    }
}

#[async_trait]
impl LyricsProvider for LyricsOvhProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    // Duration is not part of this API
    async fn fetch(
        &self,
        title: &str,
        artist: &str,
        _duration_ms: Option<u64>,
    ) -> Result<LyricResult, ProviderError> {
        let response = self
            .http_client
            .get(self.request_url(title, artist))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response
            .json::<LyricsOvhResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        to_result(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LyricsOvhResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_lyrics_normalized() {
        let result = to_result(parse(r#"{"lyrics":"\r\nLine one\r\nLine two\r\n\r\n"}"#));
        assert_eq!(
            result.unwrap(),
            LyricResult::Lyrics("Line one\nLine two".to_string())
        );
    }

    #[test]
    fn test_no_lyrics_error_is_not_found() {
        let result = to_result(parse(r#"{"error":"No lyrics found"}"#));
        assert!(matches!(result, Err(ProviderError::NotFound)));
    }

    #[test]
    fn test_other_error_is_fault() {
        let result = to_result(parse(r#"{"error":"Service unavailable"}"#));
        assert!(matches!(result, Err(ProviderError::Api(_))));
    }

    #[test]
    fn test_blank_lyrics_not_found() {
        let result = to_result(parse(r#"{"lyrics":"   "}"#));
        assert!(matches!(result, Err(ProviderError::NotFound)));
    }

    #[test]
    fn test_request_url() {
        let client = LyricsOvhProvider::with_base_url("http://localhost/v1");
        assert_eq!(
            client.request_url("Yellow Submarine", "The Beatles"),
            "http://localhost/v1/The%20Beatles/Yellow%20Submarine"
        );
    }
}
