//! Corpus subsampling: probabilistic retention of individual games.
//!
//! Produces a reduced copy of the corpus in the same concatenated-PGN
//! format, so sampled and unsampled corpora go through the identical
//! indexing code path.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::corpus::corpus_files;
use crate::error::IndexError;

/// Counters for one sampling run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SampleStats {
    pub files: usize,
    pub games_seen: u64,
    pub games_kept: u64,
}

/// Copy a random portion of each corpus file's games into `dest_dir`.
///
/// Each game is retained independently with probability `rate`. The RNG
/// is seeded explicitly and files are visited in sorted order, so the
/// same (corpus, rate, seed) always selects the same games.
pub fn sample_corpus(
    src_dir: &Path,
    dest_dir: &Path,
    rate: f64,
    seed: u64,
) -> Result<SampleStats, IndexError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(IndexError::Config(format!(
            "sampling rate must be within [0, 1], got {rate}"
        )));
    }

    std::fs::create_dir_all(dest_dir).map_err(|source| IndexError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut stats = SampleStats::default();

    for path in corpus_files(src_dir)? {
        let contents = std::fs::read_to_string(&path).map_err(|source| IndexError::Io {
            path: path.clone(),
            source,
        })?;

        let mut kept = String::new();
        let mut kept_count = 0u64;
        for game in split_games(&contents) {
            stats.games_seen += 1;
            if rng.gen::<f64>() < rate {
                kept.push_str(game);
                kept_count += 1;
            }
        }
        stats.games_kept += kept_count;

        let Some(file_name) = path.file_name() else {
            continue;
        };
        let dest = dest_dir.join(file_name);
        std::fs::write(&dest, &kept).map_err(|source| IndexError::Io {
            path: dest.clone(),
            source,
        })?;
        stats.files += 1;

        info!(file = %dest.display(), kept = kept_count, "sampled file");
    }

    info!(
        files = stats.files,
        seen = stats.games_seen,
        kept = stats.games_kept,
        "sampling complete"
    );
    Ok(stats)
}

/// Split concatenated PGN text into whole games on `[Event ` boundaries.
///
/// Leading text before the first tag (byte-order marks, stray comments)
/// is dropped, matching how the corpus files are actually laid out.
fn split_games(text: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = text.match_indices("[Event ").map(|(i, _)| i).collect();
    if starts.is_empty() {
        return Vec::new();
    }
    starts.push(text.len());
    starts.windows(2).map(|w| &text[w[0]..w[1]]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus_with_games(count: usize) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let games: String = (0..count)
            .map(|i| format!("[Event \"G{i}\"]\n[Result \"1-0\"]\n\n1. e4 1-0\n\n"))
            .collect();
        std::fs::write(dir.path().join("games.pgn"), &games).unwrap();
        (dir, games)
    }

    #[test]
    fn test_split_games_finds_every_game() {
        let text = "[Event \"A\"]\n\n1. e4 1-0\n\n[Event \"B\"]\n\n1. d4 0-1\n\n";
        let games = split_games(text);
        assert_eq!(games.len(), 2);
        assert!(games[0].starts_with("[Event \"A\"]"));
        assert!(games[1].starts_with("[Event \"B\"]"));
        // Nothing lost at the boundaries.
        assert_eq!(games.concat(), text);
    }

    #[test]
    fn test_split_games_without_tags() {
        assert!(split_games("no games here").is_empty());
    }

    #[test]
    fn test_rate_one_keeps_everything() {
        let (src, original) = corpus_with_games(10);
        let dest = tempfile::tempdir().unwrap();

        let stats = sample_corpus(src.path(), dest.path(), 1.0, 721).unwrap();
        assert_eq!(stats.games_seen, 10);
        assert_eq!(stats.games_kept, 10);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("games.pgn")).unwrap(),
            original
        );
    }

    #[test]
    fn test_rate_zero_keeps_nothing() {
        let (src, _) = corpus_with_games(10);
        let dest = tempfile::tempdir().unwrap();

        let stats = sample_corpus(src.path(), dest.path(), 0.0, 721).unwrap();
        assert_eq!(stats.games_kept, 0);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("games.pgn")).unwrap(),
            ""
        );
    }

    #[test]
    fn test_same_seed_selects_the_same_games() {
        let (src, _) = corpus_with_games(50);
        let dest_a = tempfile::tempdir().unwrap();
        let dest_b = tempfile::tempdir().unwrap();

        let a = sample_corpus(src.path(), dest_a.path(), 0.5, 42).unwrap();
        let b = sample_corpus(src.path(), dest_b.path(), 0.5, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            std::fs::read_to_string(dest_a.path().join("games.pgn")).unwrap(),
            std::fs::read_to_string(dest_b.path().join("games.pgn")).unwrap()
        );
    }

    #[test]
    fn test_invalid_rate_is_a_config_error() {
        let (src, _) = corpus_with_games(1);
        let dest = tempfile::tempdir().unwrap();
        let err = sample_corpus(src.path(), dest.path(), 1.5, 721).unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));
    }
}
