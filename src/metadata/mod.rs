//! Audio file tag reading.
//!
//! Uses the lofty crate for format-independent metadata access
//! (MP3, FLAC, OGG, M4A, WAV, ...). Only what providers search with is
//! read: title, artist and duration.

use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;

use crate::error::{Error, Result};
use crate::model::MusicInfo;

/// Turns a file path into a [`MusicInfo`].
///
/// `None` means the file could not be used; the batch drops it.
pub trait TagLoader: Send + Sync {
    fn load(&self, path: &Path) -> Option<MusicInfo>;
}

/// [`TagLoader`] backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagLoader;

impl TagLoader for LoftyTagLoader {
    fn load(&self, path: &Path) -> Option<MusicInfo> {
        match read(path) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                None
            }
        }
    }
}

/// Read title, artist and duration from an audio file.
///
/// Missing tags come back as empty strings; a zero duration as `None`.
pub fn read(path: &Path) -> Result<MusicInfo> {
    // Probe the file to determine format and read tags
    let tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("failed to open: {e}")))?
        .read()
        .map_err(|e| Error::metadata(path, format!("failed to read tags: {e}")))?;

    // Get the primary tag, or fall back to the first available tag
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let name = tag
        .and_then(|t| t.title().map(|s| s.trim().to_string()))
        .unwrap_or_default();
    let artist = tag
        .and_then(|t| t.artist().map(|s| s.trim().to_string()))
        .unwrap_or_default();

    let duration = Some(tagged_file.properties().duration()).filter(|d| !d.is_zero());

    Ok(MusicInfo::new(path).with_tags(name, artist, duration))
}
