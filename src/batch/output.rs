//! Output file locations and writes.
//!
//! Every output lives next to its audio file and shares its stem, so two
//! tracks can never write the same file.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{ResultExt, Result};

/// Extensions an album image next to a track may already have.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// `<dir>/<stem>.<extension>` for an audio file.
pub fn target_path(audio_path: &Path, extension: &str) -> PathBuf {
    audio_path.with_extension(extension.trim_start_matches('.'))
}

/// Replace whatever is at `path` with `bytes`.
pub async fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed existing file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(format!("removing {}", path.display())),
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(format!("writing {}", path.display()))
}

/// Write `bytes` unless the file already exists. Returns whether it wrote.
///
/// Creation is exclusive, so of two concurrent writers only one wins.
pub async fn write_if_absent(path: &Path, bytes: &[u8]) -> Result<bool> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e).with_context(format!("creating {}", path.display())),
    };
    file.write_all(bytes)
        .await
        .with_context(format!("writing {}", path.display()))?;
    file.flush()
        .await
        .with_context(format!("writing {}", path.display()))?;
    Ok(true)
}

/// An album image that already sits next to `audio_path`, whatever its format.
///
/// A location that cannot be checked counts as absent; the later write
/// reports the real error.
pub async fn existing_image(audio_path: &Path) -> Option<PathBuf> {
    for extension in IMAGE_EXTENSIONS {
        let candidate = target_path(audio_path, extension);
        if let Ok(true) = tokio::fs::try_exists(&candidate).await {
            return Some(candidate);
        }
    }
    None
}

/// Image extension for a MIME type reported by an artwork provider.
pub fn image_extension(mime_type: &str) -> &'static str {
    match mime_type.split(';').next().unwrap_or("").trim() {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_target_path_replaces_extension() {
        let path = Path::new("/music/Artist/01 - Song.flac");
        assert_eq!(
            target_path(path, "lrc"),
            PathBuf::from("/music/Artist/01 - Song.lrc")
        );
        assert_eq!(
            target_path(path, ".jpg"),
            PathBuf::from("/music/Artist/01 - Song.jpg")
        );
    }

    #[test]
    fn test_target_path_keeps_inner_dots() {
        let path = Path::new("/music/Mr. Jones.mp3");
        assert_eq!(target_path(path, "lrc"), PathBuf::from("/music/Mr. Jones.lrc"));
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/png"), "png");
        assert_eq!(image_extension("image/jpeg"), "jpg");
        assert_eq!(image_extension("image/png; charset=binary"), "png");
        assert_eq!(image_extension(""), "jpg");
    }

    #[tokio::test]
    async fn test_replace_file_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.lrc");
        std::fs::write(&path, b"old lyrics that are longer").unwrap();

        replace_file(&path, b"new").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_replace_file_creates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.lrc");
        replace_file(&path, b"fresh").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_write_if_absent_keeps_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.jpg");
        std::fs::write(&path, b"original").unwrap();

        assert!(!write_if_absent(&path, b"replacement").await.unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), b"original");

        let other = dir.path().join("other.jpg");
        assert!(write_if_absent(&other, b"image").await.unwrap());
        assert_eq!(std::fs::read(&other).unwrap(), b"image");
    }

    #[tokio::test]
    async fn test_write_if_absent_only_one_concurrent_writer_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.jpg");

        let (first, second) = tokio::join!(
            write_if_absent(&path, b"first"),
            write_if_absent(&path, b"second")
        );

        let wrote = [first.unwrap(), second.unwrap()];
        assert_eq!(wrote.iter().filter(|w| **w).count(), 1);
        let content = std::fs::read(&path).unwrap();
        assert!(content == b"first" || content == b"second");
    }

    #[tokio::test]
    async fn test_write_if_absent_reports_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone").join("song.jpg");
        assert!(write_if_absent(&path, b"image").await.is_err());
    }

    #[tokio::test]
    async fn test_existing_image_finds_any_format() {
        let dir = tempdir().unwrap();
        let audio = dir.path().join("song.flac");
        assert_eq!(existing_image(&audio).await, None);

        std::fs::write(dir.path().join("song.png"), b"png").unwrap();
        assert_eq!(existing_image(&audio).await, Some(dir.path().join("song.png")));
    }
}
