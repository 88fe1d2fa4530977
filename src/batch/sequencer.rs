//! Per-track provider fallback.
//!
//! A track walks the resolved chain one provider at a time. The first
//! provider that finds lyrics ends the walk. "Not found" moves on to the
//! next provider; a fault ends the walk unless the fault policy says to
//! keep going. The result is always recorded on the track, never returned
//! as an error.

use std::sync::Arc;

use crate::config::FaultPolicy;
use crate::model::MusicInfo;
use crate::providers::{Lookup, LyricResult, LyricsProvider};

use super::encoding::TargetEncoding;
use super::output;

/// Walks a lyric provider chain for one track at a time.
pub struct LyricSequencer {
    chain: Vec<Arc<dyn LyricsProvider>>,
    encoding: TargetEncoding,
    extension: String,
    fault_policy: FaultPolicy,
}

impl LyricSequencer {
    pub fn new(
        chain: Vec<Arc<dyn LyricsProvider>>,
        encoding: TargetEncoding,
        extension: impl Into<String>,
        fault_policy: FaultPolicy,
    ) -> Self {
        Self {
            chain,
            encoding,
            extension: extension.into(),
            fault_policy,
        }
    }

    /// Provider names in the order they will be tried.
    pub fn chain_names(&self) -> Vec<&str> {
        self.chain.iter().map(|p| p.name()).collect()
    }

    /// Try providers in order and record the outcome on `item`.
    pub async fn run(&self, mut item: MusicInfo) -> MusicInfo {
        if self.chain.is_empty() {
            tracing::warn!(
                target: "batch::lyrics",
                path = %item.path().display(),
                "No lyric providers enabled"
            );
            item.mark(false);
            return item;
        }

        let last = self.chain.len() - 1;
        for (index, provider) in self.chain.iter().enumerate() {
            let lookup: Lookup<LyricResult> = provider
                .fetch(&item.name, &item.artist, item.duration_millis())
                .await
                .into();

            match lookup {
                Lookup::Found(result) => {
                    let written = self.store(&item, provider.name(), result).await;
                    item.mark(written);
                    return item;
                }
                Lookup::NotFound => {
                    tracing::warn!(
                        target: "batch::lyrics",
                        provider = provider.name(),
                        name = %item.name,
                        artist = %item.artist,
                        "No lyrics found"
                    );
                    if index == last {
                        item.mark(false);
                    }
                }
                Lookup::Fault(e) => {
                    tracing::error!(
                        target: "batch::lyrics",
                        provider = provider.name(),
                        path = %item.path().display(),
                        name = %item.name,
                        artist = %item.artist,
                        error = %e,
                        "Lyric provider failed"
                    );
                    if self.fault_policy == FaultPolicy::Abort || index == last {
                        item.mark(false);
                        return item;
                    }
                }
            }
        }
        item
    }

    /// Write a found result. Returns whether the track counts as done.
    async fn store(&self, item: &MusicInfo, provider: &str, result: LyricResult) -> bool {
        let text = match result {
            LyricResult::Instrumental => {
                tracing::info!(
                    target: "batch::lyrics",
                    provider,
                    name = %item.name,
                    "Instrumental track, nothing to write"
                );
                return true;
            }
            LyricResult::Lyrics(text) => text,
        };

        let target = output::target_path(item.path(), &self.extension);
        let bytes = self.encoding.encode(&text);
        match output::replace_file(&target, &bytes).await {
            Ok(()) => {
                tracing::info!(
                    target: "batch::lyrics",
                    provider,
                    path = %target.display(),
                    bytes = bytes.len(),
                    "Lyrics written"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    target: "batch::lyrics",
                    path = %target.display(),
                    error = %e,
                    "Failed to write lyrics"
                );
                false
            }
        }
    }
}
