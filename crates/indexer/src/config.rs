//! Runtime configuration for the indexing CLI.

use std::env;
use std::path::PathBuf;

use crate::error::IndexError;

/// Half-move-pairs per game eligible for indexing.
pub const DEFAULT_DEPTH_BOUND: usize = 10;

/// Fraction of games the sampler keeps when no rate is given.
pub const DEFAULT_SAMPLE_RATE: f64 = 0.005;

/// Fixed sampling seed so repeated default runs agree.
pub const DEFAULT_SAMPLE_SEED: u64 = 721;

#[derive(Clone, Debug)]
pub struct Config {
    /// Directory the fetcher deposits the full corpus into.
    pub all_games_dir: PathBuf,
    /// Directory holding the (possibly sampled) corpus to index.
    pub corpus_dir: PathBuf,
    /// Half-move-pairs per game eligible for indexing.
    pub depth_bound: usize,
    /// Extraction workers; `None` selects the sequential indexer.
    pub workers: Option<usize>,
    /// Persisted index location.
    pub index_path: PathBuf,
}

impl Config {
    /// Configuration from environment variables, with defaults mirroring
    /// the data layout the tool has always used. CLI flags override
    /// individual fields afterwards.
    pub fn from_env() -> Self {
        let data_dir = env::var("OPENINGS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Self {
            all_games_dir: data_dir.join("all_games"),
            corpus_dir: data_dir.join("sampled_games"),
            depth_bound: env::var("OPENINGS_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DEPTH_BOUND),
            workers: None,
            index_path: data_dir.join("analysis.json"),
        }
    }

    /// Reject invalid combinations before any indexing work starts, so a
    /// bad run never produces a partial index.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.depth_bound == 0 {
            return Err(IndexError::Config(
                "depth bound must be a positive number of move pairs".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(IndexError::Config(
                "worker count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
