//! Preference store errors.

use std::path::PathBuf;

/// Errors raised while persisting preferences.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("preferences I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrefsError>;
