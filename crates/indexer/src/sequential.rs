//! Single-threaded corpus indexing.

use std::path::Path;

use tracing::info;

use crate::corpus::{corpus_files, extract_file_keys};
use crate::error::IndexError;
use crate::store::PositionIndex;

/// Walk `corpus_dir` and index every classified game in-process.
///
/// Files are visited in sorted order; within a file, games and positions
/// in transcript order. The first unreadable or malformed file aborts
/// the run.
pub fn index_sequential(
    corpus_dir: &Path,
    depth_bound: usize,
    store: &PositionIndex,
) -> Result<(), IndexError> {
    for path in corpus_files(corpus_dir)? {
        let extracted = extract_file_keys(&path, depth_bound)?;
        for key in &extracted.keys {
            store.increment(key);
        }
        info!(
            file = %path.display(),
            games = extracted.games_seen,
            indexed = extracted.games_indexed,
            positions = extracted.keys.len(),
            "indexed file"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus_yields_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionIndex::new();
        index_sequential(dir.path(), 10, &store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_counts_accumulate_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let game = "[Event \"T\"]\n[Result \"1-0\"]\n\n1. e4 e5 1-0\n\n";
        std::fs::write(dir.path().join("a.pgn"), game).unwrap();
        std::fs::write(dir.path().join("b.pgn"), game).unwrap();

        let store = PositionIndex::new();
        index_sequential(dir.path(), 10, &store).unwrap();

        // Two identical games, two half-moves each.
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_observations(), 4);
        assert!(store.snapshot().values().all(|&count| count == 2));
    }
}
