//! Index persistence: a JSON key -> count mapping, written atomically.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::IndexError;
use crate::store::PositionIndex;

/// Serialize the finished index to `path`.
///
/// The snapshot is written to a temporary file in the destination
/// directory and renamed into place, so a crash or failed run never
/// leaves a partial file and the previous index survives until the new
/// one is complete. Each run fully overwrites the previous mapping.
pub fn persist(store: &PositionIndex, path: &Path) -> Result<(), IndexError> {
    write_mapping(&store.snapshot(), path)
}

/// Write an in-memory mapping to `path` via temp-file-then-rename.
///
/// `BTreeMap` iteration is key-sorted, so equal mappings always
/// serialize to byte-identical files.
pub fn write_mapping(mapping: &BTreeMap<String, u64>, path: &Path) -> Result<(), IndexError> {
    let io_err = |source: std::io::Error| IndexError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let json = serde_json::to_string_pretty(mapping).map_err(|source| IndexError::IndexFormat {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|err| IndexError::Io {
        path: path.to_path_buf(),
        source: err.error,
    })?;

    info!(index = %path.display(), keys = mapping.len(), "index written");
    Ok(())
}

/// Load a persisted index mapping; the exact inverse of [`write_mapping`].
pub fn load(path: &Path) -> Result<BTreeMap<String, u64>, IndexError> {
    let contents = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| IndexError::IndexFormat {
        path: path.to_path_buf(),
        source,
    })
}
