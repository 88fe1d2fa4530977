use futures::StreamExt;
use futures::stream::Stream;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Default audio extensions (matched case-insensitively).
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a", "ape", "wma", "opus"];

/// Scans the given root directory recursively for files with one of `extensions`.
///
/// Extensions are compared case-insensitively and without a leading dot.
/// Returns a Stream of PathBufs.
pub fn scan(root: PathBuf, extensions: Vec<String>) -> impl Stream<Item = PathBuf> {
    let (tx, rx) = mpsc::channel(100);
    let extensions: Vec<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    // Spawn a blocking task to perform the synchronous file system traversal
    tokio::task::spawn_blocking(move || {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && has_extension(entry.path(), &extensions) {
                // If the receiver is dropped, stop scanning.
                if tx.blocking_send(entry.path().to_path_buf()).is_err() {
                    break;
                }
            }
        }
    });

    // Convert the mpsc Receiver into a Stream
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|path| (path, rx))
    })
}

/// Scan `root` and collect the matches, sorted.
///
/// An empty result is an error: there is nothing for a batch to do.
pub async fn collect(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = scan(root.to_path_buf(), extensions.to_vec()).collect().await;
    if paths.is_empty() {
        return Err(Error::NoFilesFound(root.to_path_buf()));
    }
    paths.sort();
    tracing::info!(root = %root.display(), files = paths.len(), "Scan complete");
    Ok(paths)
}

/// Check whether a path ends in one of the (lowercase) extensions
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
