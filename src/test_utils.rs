//! Test utilities and fixtures for music-fetcher tests.
//!
//! Mock providers count their calls and answer from a script, so tests can
//! assert exactly which providers were asked about which tracks.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MockLyrics, Reply, track};
//!
//! let provider = MockLyrics::always("a", Reply::NotFound);
//! let item = sequencer.run(track(dir.path(), "song.mp3", "Song", "Artist")).await;
//! assert_eq!(provider.calls(), 1);
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::metadata::TagLoader;
use crate::model::MusicInfo;
use crate::providers::{AlbumArt, AlbumProvider, LyricResult, LyricsProvider, ProviderError};

/// Creates a MusicInfo for `dir/file` with the given tags.
pub fn track(dir: &Path, file: &str, name: &str, artist: &str) -> MusicInfo {
    MusicInfo::new(dir.join(file)).with_tags(name, artist, None)
}

/// A scripted provider answer.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Lyrics(&'static str),
    Instrumental,
    NotFound,
    /// Unclassified failure
    Fault,
    /// Artwork bytes
    Image(&'static [u8]),
}

impl Reply {
    pub fn into_result(self) -> Result<LyricResult, ProviderError> {
        match self {
            Reply::Lyrics(text) => Ok(LyricResult::Lyrics(text.to_string())),
            Reply::Instrumental => Ok(LyricResult::Instrumental),
            Reply::NotFound | Reply::Image(_) => Err(ProviderError::NotFound),
            Reply::Fault => Err(ProviderError::Network("connection reset".to_string())),
        }
    }

    fn into_art(self) -> Result<AlbumArt, ProviderError> {
        match self {
            Reply::Image(data) => Ok(AlbumArt {
                data: data.to_vec(),
                mime_type: "image/jpeg".to_string(),
                url: "https://coverart.example.com/front".to_string(),
            }),
            Reply::Fault => Err(ProviderError::Network("connection reset".to_string())),
            _ => Err(ProviderError::NotFound),
        }
    }
}

/// Answers by track title, falling back to a default reply.
struct Script {
    default: Reply,
    by_title: HashMap<String, Reply>,
}

impl Script {
    fn reply_for(&self, title: &str) -> Reply {
        self.by_title.get(title).copied().unwrap_or(self.default)
    }
}

/// Mock lyric provider.
pub struct MockLyrics {
    name: String,
    script: Script,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String, Option<u64>)>>,
}

impl MockLyrics {
    /// Same reply for every track.
    pub fn always(name: &str, reply: Reply) -> Arc<Self> {
        Self::scripted(name, reply, &[])
    }

    /// Reply per title, `default` for any other track.
    pub fn scripted(name: &str, default: Reply, by_title: &[(&str, Reply)]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script: Script {
                default,
                by_title: by_title.iter().map(|(t, r)| (t.to_string(), *r)).collect(),
            },
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (title, artist, duration_ms) of every request, in arrival order.
    pub fn requests(&self) -> Vec<(String, String, Option<u64>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LyricsProvider for MockLyrics {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        title: &str,
        artist: &str,
        duration_ms: Option<u64>,
    ) -> Result<LyricResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((title.to_string(), artist.to_string(), duration_ms));
        tokio::task::yield_now().await;
        self.script.reply_for(title).into_result()
    }
}

/// Mock artwork provider.
pub struct MockAlbum {
    name: String,
    script: Script,
    calls: AtomicUsize,
}

impl MockAlbum {
    pub fn always(name: &str, reply: Reply) -> Arc<Self> {
        Self::scripted(name, reply, &[])
    }

    pub fn scripted(name: &str, default: Reply, by_title: &[(&str, Reply)]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script: Script {
                default,
                by_title: by_title.iter().map(|(t, r)| (t.to_string(), *r)).collect(),
            },
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlbumProvider for MockAlbum {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, title: &str, _artist: &str) -> Result<AlbumArt, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.script.reply_for(title).into_art()
    }
}

/// Tag loader that reads tags from a table keyed by file name.
///
/// Files not in the table load as unreadable (`None`).
#[derive(Default)]
pub struct MockTagLoader {
    tags: HashMap<String, (String, String)>,
}

impl MockTagLoader {
    pub fn with(mut self, file: &str, name: &str, artist: &str) -> Self {
        self.tags
            .insert(file.to_string(), (name.to_string(), artist.to_string()));
        self
    }
}

impl TagLoader for MockTagLoader {
    fn load(&self, path: &Path) -> Option<MusicInfo> {
        let file = path.file_name()?.to_str()?;
        let (name, artist) = self.tags.get(file)?;
        Some(MusicInfo::new(path).with_tags(name.as_str(), artist.as_str(), None))
    }
}

/// Creates empty audio files in `dir` so the scanner finds them.
pub fn touch_all(dir: &Path, files: &[&str]) {
    for file in files {
        std::fs::File::create(dir.join(file)).expect("Failed to create test file");
    }
}
