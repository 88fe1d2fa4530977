//! Core data model for a batch run.
//!
//! A [`MusicInfo`] is created per audio file by the tag loader, moved into
//! the task that processes it, and handed back with its outcome recorded.
//! [`BatchOutcome`] is folded from the final items once every task is done.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// One audio file being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicInfo {
    /// Source file path (identity, never changes)
    path: PathBuf,
    /// Track title from tags
    pub name: String,
    /// Artist name from tags
    pub artist: String,
    /// Total duration, if the container reports one
    pub duration: Option<Duration>,
    /// `None` until attempted, then whether a provider succeeded
    pub success: Option<bool>,
}

impl MusicInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: String::new(),
            artist: String::new(),
            duration: None,
            success: None,
        }
    }

    /// Fill in what the tag loader found.
    pub fn with_tags(
        mut self,
        name: impl Into<String>,
        artist: impl Into<String>,
        duration: Option<Duration>,
    ) -> Self {
        self.name = name.into();
        self.artist = artist.into();
        self.duration = duration;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for log and progress lines.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// True when there is nothing to search providers with.
    pub fn is_unsearchable(&self) -> bool {
        self.name.trim().is_empty() && self.artist.trim().is_empty()
    }

    /// Duration in whole milliseconds, as lyric providers expect it.
    pub fn duration_millis(&self) -> Option<u64> {
        self.duration.map(|d| d.as_millis() as u64)
    }

    pub fn mark(&mut self, success: bool) {
        self.success = Some(success);
    }
}

/// Aggregate counts for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Items that reached the provider stage
    pub total: usize,
    pub succeeded: usize,
    /// Items marked failed, or never attempted
    pub failed: usize,
    /// Items dropped before the provider stage (existing output, no tags)
    pub skipped: usize,
}

impl BatchOutcome {
    /// Fold final item states into counts.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a MusicInfo>) -> Self {
        items
            .into_iter()
            .fold(Self::default(), |mut outcome, item| {
                outcome.total += 1;
                match item.success {
                    Some(true) => outcome.succeeded += 1,
                    _ => outcome.failed += 1,
                }
                outcome
            })
    }

    pub fn with_skipped(self, skipped: usize) -> Self {
        Self { skipped, ..self }
    }

    /// Combine outcomes of independent stages.
    pub fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            succeeded: self.succeeded + other.succeeded,
            failed: self.failed + other.failed,
            skipped: self.skipped + other.skipped,
        }
    }
}
