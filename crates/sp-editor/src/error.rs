//! Errors.
//!
//! Two tiers. [`Error::Open`] and [`Error::Terminal`] are fatal: the editor
//! cannot establish a baseline state and the binary exits. [`Error::Save`]
//! is recoverable: it is reported on the message bar and the user may retry.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Editor error.
#[derive(Debug, Error)]
pub enum Error {
    /// A file requested at startup could not be opened.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the document to its file failed.
    #[error("I/O error: {0}")]
    Save(#[source] io::Error),

    /// The terminal driver failed (attributes, window size, read, write).
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

impl Error {
    /// Whether the editor must terminate after this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Save(_))
    }
}

/// Result alias used across the editor core.
pub type Result<T, E = Error> = std::result::Result<T, E>;
