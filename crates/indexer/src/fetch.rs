//! Corpus acquisition: download catalog-listed PGN files.
//!
//! The indexers only require the corpus directory to exist and hold
//! transcript files; this collaborator fills it from a remote catalog
//! page listing `.pgn` downloads.

use std::path::Path;
use std::time::Duration;

use regex::Regex;
use tracing::{info, warn};

use crate::error::IndexError;

/// Catalog page scraped when none is configured (the corpus the index
/// was originally built from).
pub const DEFAULT_CATALOG_URL: &str = "http://www.pgnmentor.com/files.html";

/// Resolve every `.pgn` link on a catalog page to `(url, file_name)`.
fn pgn_links(page: &str, catalog_url: &str) -> Vec<(String, String)> {
    let base = catalog_url
        .rsplit_once('/')
        .map(|(base, _)| base)
        .unwrap_or(catalog_url);
    let link_re = Regex::new(r#"href="([^"]+\.pgn)""#).unwrap();

    link_re
        .captures_iter(page)
        .filter_map(|cap| {
            let href = cap[1].to_string();
            let name = href.rsplit('/').next()?.to_string();
            if name.is_empty() {
                return None;
            }
            let url = if href.starts_with("http://") || href.starts_with("https://") {
                href
            } else {
                format!("{base}/{href}")
            };
            Some((url, name))
        })
        .collect()
}

/// Download every `.pgn` file linked from `catalog_url` into `dest_dir`,
/// creating the directory if needed. Returns the number of files written.
///
/// A catalog fetch failure is an error; individual download failures are
/// logged and skipped, since the indexers work off whatever files made
/// it into the directory.
pub async fn fetch_corpus(catalog_url: &str, dest_dir: &Path) -> Result<usize, IndexError> {
    std::fs::create_dir_all(dest_dir).map_err(|source| IndexError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let client = reqwest::Client::builder()
        .user_agent("chess-openings/1.0")
        .timeout(Duration::from_secs(120))
        .build()?;

    let page = client
        .get(catalog_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let links = pgn_links(&page, catalog_url);
    info!(catalog = catalog_url, files = links.len(), "catalog scanned");

    let mut written = 0usize;
    for (url, name) in links {
        let dest = dest_dir.join(&name);
        match download(&client, &url, &dest).await {
            Ok(bytes) => {
                written += 1;
                info!(file = %dest.display(), bytes, "fetched");
            }
            Err(err) => warn!(url = %url, error = %err, "skipping download"),
        }
    }

    info!(files = written, dir = %dest_dir.display(), "corpus fetch complete");
    Ok(written)
}

async fn download(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64, IndexError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    std::fs::write(dest, &body).map_err(|source| IndexError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    Ok(body.len() as u64)
}
