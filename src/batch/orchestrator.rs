//! Lyric and album batch pipelines.
//!
//! Both pipelines share the same front half: scan a directory, load tags
//! with bounded concurrency, drop tracks with nothing to search for. The
//! lyric pipeline then runs [`LyricSequencer`] per track; the album
//! pipeline asks its single artwork provider. Counts are folded from the
//! final track states after every task has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::FaultPolicy;
use crate::error::{Error, Result};
use crate::metadata::TagLoader;
use crate::model::{BatchOutcome, MusicInfo};
use crate::providers::{AlbumProvider, Lookup, LyricsProvider};
use crate::scanner;

use super::encoding::TargetEncoding;
use super::output;
use super::runner::run_bounded;
use super::sequencer::LyricSequencer;

/// Lyric pipeline settings
#[derive(Debug, Clone)]
pub struct LyricOptions {
    /// Skip tracks that already have a lyric file
    pub skip_existing: bool,
    /// WHATWG label of the output encoding
    pub encoding: String,
    /// Lyric file extension
    pub extension: String,
    pub fault_policy: FaultPolicy,
}

impl Default for LyricOptions {
    fn default() -> Self {
        Self {
            skip_existing: false,
            encoding: "utf-8".to_string(),
            extension: "lrc".to_string(),
            fault_policy: FaultPolicy::default(),
        }
    }
}

/// Tags read by [`Orchestrator::load_metadata`].
#[derive(Debug, Default)]
pub struct LoadedTracks {
    /// Files whose tags could be read
    pub items: Vec<MusicInfo>,
    /// Files whose loader task crashed
    pub failed: usize,
}

/// What a pipeline run produced.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub outcome: BatchOutcome,
    /// Final state of every track that reached the provider stage
    pub items: Vec<MusicInfo>,
}

/// Runs batches over a music directory.
pub struct Orchestrator {
    tag_loader: Arc<dyn TagLoader>,
    concurrency: usize,
    audio_extensions: Vec<String>,
}

impl Orchestrator {
    /// `concurrency` bounds both the tag-loading and the provider stage.
    pub fn new(
        tag_loader: Arc<dyn TagLoader>,
        concurrency: usize,
        audio_extensions: Vec<String>,
    ) -> Result<Self> {
        if concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        if audio_extensions.is_empty() {
            return Err(Error::config("no audio extensions configured"));
        }
        Ok(Self {
            tag_loader,
            concurrency,
            audio_extensions,
        })
    }

    /// Fetch lyrics for every track under `root`.
    pub async fn run_lyrics(
        &self,
        root: &Path,
        chain: Vec<Arc<dyn LyricsProvider>>,
        options: &LyricOptions,
    ) -> Result<PipelineReport> {
        // Validate before touching the disk or any provider
        let encoding = TargetEncoding::from_label(&options.encoding)?;

        let mut paths = scanner::collect(root, &self.audio_extensions).await?;
        let scanned = paths.len();

        if options.skip_existing {
            paths = without_existing(paths, &options.extension).await;
            tracing::info!(
                target: "batch::lyrics",
                skipped = scanned - paths.len(),
                "Skipping tracks that already have lyrics"
            );
        }

        let loaded = self.load_metadata(paths).await?;
        let items = self.searchable(loaded.items);

        let sequencer = Arc::new(LyricSequencer::new(
            chain,
            encoding,
            options.extension.clone(),
            options.fault_policy,
        ));
        tracing::info!(
            target: "batch::lyrics",
            tracks = items.len(),
            chain = ?sequencer.chain_names(),
            encoding = encoding.name(),
            "Fetching lyrics"
        );

        let units = items.into_iter().map(|item| {
            let sequencer = Arc::clone(&sequencer);
            move || async move { sequencer.run(item).await }
        });
        let report = self.finish(
            run_bounded(units, self.concurrency).await?,
            scanned,
            loaded.failed,
        );

        tracing::info!(
            target: "batch::lyrics",
            total = report.outcome.total,
            succeeded = report.outcome.succeeded,
            failed = report.outcome.failed,
            skipped = report.outcome.skipped,
            "Lyric batch finished"
        );
        Ok(report)
    }

    /// Fetch album artwork for every track under `root` from one provider.
    pub async fn run_albums(
        &self,
        root: &Path,
        provider: Arc<dyn AlbumProvider>,
    ) -> Result<PipelineReport> {
        let paths = scanner::collect(root, &self.audio_extensions).await?;
        let scanned = paths.len();
        let loaded = self.load_metadata(paths).await?;
        let items = self.searchable(loaded.items);

        tracing::info!(
            target: "batch::album",
            tracks = items.len(),
            provider = provider.name(),
            "Fetching album art"
        );

        let units = items.into_iter().map(|item| {
            let provider = Arc::clone(&provider);
            move || async move { fetch_album(provider.as_ref(), item).await }
        });
        let report = self.finish(
            run_bounded(units, self.concurrency).await?,
            scanned,
            loaded.failed,
        );

        tracing::info!(
            target: "batch::album",
            total = report.outcome.total,
            succeeded = report.outcome.succeeded,
            failed = report.outcome.failed,
            skipped = report.outcome.skipped,
            "Album batch finished"
        );
        Ok(report)
    }

    /// Read tags for every path, `concurrency` files at a time.
    ///
    /// Unreadable files are dropped. A loader that panics fails its unit,
    /// which is counted in [`LoadedTracks::failed`].
    pub async fn load_metadata(&self, paths: Vec<PathBuf>) -> Result<LoadedTracks> {
        let units = paths.into_iter().map(|path| {
            let loader = Arc::clone(&self.tag_loader);
            move || async move {
                let path_str = path.display().to_string();
                match tokio::task::spawn_blocking(move || loader.load(&path)).await {
                    Ok(info) => info,
                    Err(e) if e.is_panic() => {
                        tracing::error!(
                            target: "batch::runner",
                            path = %path_str,
                            "Tag loader panicked"
                        );
                        std::panic::resume_unwind(e.into_panic())
                    }
                    Err(_) => None,
                }
            }
        });

        Ok(run_bounded(units, self.concurrency).await?.into_iter().fold(
            LoadedTracks::default(),
            |mut loaded, result| {
                match result {
                    Ok(Some(info)) => loaded.items.push(info),
                    Ok(None) => {}
                    Err(_) => loaded.failed += 1,
                }
                loaded
            },
        ))
    }

    /// Drop tracks without a title or artist.
    fn searchable(&self, items: Vec<MusicInfo>) -> Vec<MusicInfo> {
        let (unsearchable, searchable): (Vec<_>, Vec<_>) =
            items.into_iter().partition(MusicInfo::is_unsearchable);
        for item in &unsearchable {
            tracing::debug!(path = %item.path().display(), "No title or artist, skipping");
        }
        searchable
    }

    /// Fold task results into a report. Tasks that died, here or while
    /// loading tags, count as failures.
    fn finish(
        &self,
        results: Vec<super::runner::UnitResult<MusicInfo>>,
        scanned: usize,
        load_failures: usize,
    ) -> PipelineReport {
        let mut lost = load_failures;
        let mut items = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(_) => lost += 1,
            }
        }

        let attempted = items.len() + lost;
        let outcome = BatchOutcome::from_items(&items)
            .merge(BatchOutcome {
                total: lost,
                failed: lost,
                ..Default::default()
            })
            .with_skipped(scanned - attempted);

        PipelineReport { outcome, items }
    }
}

/// Paths whose lyric file does not exist yet.
async fn without_existing(paths: Vec<PathBuf>, extension: &str) -> Vec<PathBuf> {
    let mut pending = Vec::with_capacity(paths.len());
    for path in paths {
        let target = output::target_path(&path, extension);
        match tokio::fs::try_exists(&target).await {
            Ok(true) => {}
            Ok(false) => pending.push(path),
            Err(e) => {
                tracing::warn!(
                    target: "batch::lyrics",
                    path = %target.display(),
                    error = %e,
                    "Could not check for existing lyrics, fetching anyway"
                );
                pending.push(path);
            }
        }
    }
    pending
}

/// Ask the artwork provider for one track and save the image.
async fn fetch_album(provider: &dyn AlbumProvider, mut item: MusicInfo) -> MusicInfo {
    if let Some(existing) = output::existing_image(item.path()).await {
        tracing::debug!(
            target: "batch::album",
            path = %existing.display(),
            "Album art already present"
        );
        item.mark(true);
        return item;
    }

    let lookup: Lookup<_> = provider.fetch(&item.name, &item.artist).await.into();

    match lookup {
        Lookup::Found(art) if art.data.is_empty() => {
            tracing::warn!(
                target: "batch::album",
                name = %item.name,
                url = %art.url,
                "Provider returned an empty image"
            );
            item.mark(false);
        }
        Lookup::Found(art) => {
            let target = output::target_path(item.path(), output::image_extension(&art.mime_type));
            match output::write_if_absent(&target, &art.data).await {
                Ok(true) => {
                    tracing::info!(
                        target: "batch::album",
                        path = %target.display(),
                        bytes = art.data.len(),
                        "Album art written"
                    );
                    item.mark(true);
                }
                Ok(false) => {
                    tracing::debug!(
                        target: "batch::album",
                        path = %target.display(),
                        "Album art already present"
                    );
                    item.mark(true);
                }
                Err(e) => {
                    tracing::error!(
                        target: "batch::album",
                        path = %target.display(),
                        error = %e,
                        "Failed to write album art"
                    );
                    item.mark(false);
                }
            }
        }
        Lookup::NotFound => {
            tracing::warn!(
                target: "batch::album",
                name = %item.name,
                artist = %item.artist,
                "No album art found"
            );
            item.mark(false);
        }
        Lookup::Fault(e) => {
            tracing::error!(
                target: "batch::album",
                path = %item.path().display(),
                name = %item.name,
                artist = %item.artist,
                error = %e,
                "Album provider failed"
            );
            item.mark(false);
        }
    }
    item
}
