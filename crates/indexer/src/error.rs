//! Error taxonomy for indexing runs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid configuration, rejected before any indexing work starts.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transcript that does not parse is fatal to the run; the corpus
    /// is assumed well-formed.
    #[error("malformed PGN in {path}: {source}")]
    MalformedPgn {
        path: PathBuf,
        #[source]
        source: openings_core::ExtractError,
    },

    #[error("malformed index file {path}: {source}")]
    IndexFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("indexing task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}
