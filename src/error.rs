//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: batch-level errors. Anything returned as an [`Error`] from the
//!   batch engine aborts the whole run before work starts.
//! - [`ProviderError`](crate::providers::ProviderError): per-request provider
//!   failures, always contained to the track being processed.
//!
//! # Example
//!
//! ```ignore
//! use music_fetcher::error::{Error, Result};
//!
//! fn check(limit: usize) -> Result<()> {
//!     if limit == 0 {
//!         return Err(Error::config("concurrency must be at least 1"));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid concurrency, unknown encoding, bad provider setup
    #[error("Configuration error: {0}")]
    Config(String),

    /// The scan produced no audio files
    #[error("No audio files found in {0}")]
    NoFilesFound(PathBuf),

    /// Tag reading error
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error must abort a batch before any work starts.
    pub fn is_batch_fatal(&self) -> bool {
        match self {
            Self::Config(_) | Self::NoFilesFound(_) => true,
            Self::WithContext { source, .. } => source.is_batch_fatal(),
            _ => false,
        }
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
