//! Corpus directory walking and per-file key extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use openings_core::{extract_keys, ExtractError, FileKeys};

use crate::error::IndexError;

/// List the transcript files in a corpus directory, sorted by path.
///
/// The sort gives the walk a stable, documented order for a fixed
/// filesystem state. Index counts are order-independent (increments
/// commute), but the sampler's RNG stream is not, so the contract lives
/// here where both consumers share it. An empty directory is a valid,
/// zero-result corpus.
pub fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>, IndexError> {
    let entries = std::fs::read_dir(dir).map_err(|source| IndexError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IndexError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one corpus file into its index keys.
pub fn extract_file_keys(path: &Path, depth_bound: usize) -> Result<FileKeys, IndexError> {
    let file = File::open(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    extract_keys(BufReader::new(file), depth_bound).map_err(|source| match source {
        ExtractError::Io(source) => IndexError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => IndexError::MalformedPgn {
            path: path.to_path_buf(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_files_sorted_and_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pgn"), "").unwrap();
        std::fs::write(dir.path().join("a.pgn"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = corpus_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.pgn", "b.pgn"]);
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let err = corpus_files(Path::new("/nonexistent/corpus")).unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }));
    }

    #[test]
    fn test_extract_file_keys_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pgn");
        std::fs::write(&path, "[Result \"1-0\"]\n\n1. e5 1-0\n").unwrap();

        let err = extract_file_keys(&path, 10).unwrap_err();
        match err {
            IndexError::MalformedPgn { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected MalformedPgn, got {other}"),
        }
    }
}
