//! Concurrent corpus indexing.
//!
//! Three stages wired by bounded channels: a discovery task emitting one
//! task per corpus file, a pool of extraction workers parsing files into
//! index keys, and a single aggregator draining every worker's output
//! into the shared store. The multi-producer key channel is the fan-in:
//! workers only ever see the shared sink, never each other.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, warn};

use crate::corpus::{corpus_files, extract_file_keys};
use crate::error::IndexError;
use crate::store::PositionIndex;

const FILE_QUEUE_CAPACITY: usize = 64;
const KEY_QUEUE_CAPACITY: usize = 1024;

/// Index `corpus_dir` with `worker_count` parallel extraction workers.
///
/// Produces exactly the counts [`index_sequential`] would for the same
/// corpus and depth bound, for any worker count; only the interleaving
/// of increments differs. An error in any worker raises the shared
/// cancellation signal, which every blocking send and receive races so
/// no stage can hang, and is returned once all tasks have drained.
///
/// [`index_sequential`]: crate::sequential::index_sequential
pub async fn index_concurrent(
    corpus_dir: &Path,
    depth_bound: usize,
    store: Arc<PositionIndex>,
    worker_count: usize,
) -> Result<(), IndexError> {
    let files = corpus_files(corpus_dir)?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let cancel_tx = Arc::new(cancel_tx);

    let (file_tx, file_rx) = mpsc::channel::<PathBuf>(FILE_QUEUE_CAPACITY);
    let file_rx = Arc::new(Mutex::new(file_rx));
    let (key_tx, mut key_rx) = mpsc::channel::<String>(KEY_QUEUE_CAPACITY);

    // Discovery: one task per corpus file, until the walk completes, the
    // signal is raised, or every worker is gone.
    let mut discovery_cancel = cancel_rx.clone();
    let discovery = tokio::spawn(async move {
        for path in files {
            tokio::select! {
                _ = discovery_cancel.changed() => break,
                sent = file_tx.send(path) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut workers = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let file_rx = Arc::clone(&file_rx);
        let key_tx = key_tx.clone();
        let cancel_tx = Arc::clone(&cancel_tx);
        let mut cancelled = cancel_rx.clone();

        workers.push(tokio::spawn(async move {
            loop {
                let path = {
                    let mut file_rx = file_rx.lock().await;
                    tokio::select! {
                        _ = cancelled.changed() => return Ok(()),
                        path = file_rx.recv() => match path {
                            Some(path) => path,
                            None => return Ok(()),
                        },
                    }
                };

                let extracted = match extract_file_keys(&path, depth_bound) {
                    Ok(extracted) => extracted,
                    Err(err) => {
                        // Wake the other stages before reporting back.
                        let _ = cancel_tx.send(true);
                        return Err(err);
                    }
                };

                debug!(
                    worker_id,
                    file = %path.display(),
                    games = extracted.games_seen,
                    positions = extracted.keys.len(),
                    "extracted file"
                );

                for key in extracted.keys {
                    tokio::select! {
                        _ = cancelled.changed() => return Ok(()),
                        sent = key_tx.send(key) => {
                            if sent.is_err() {
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }));
    }

    // The workers now hold the only senders; dropping ours lets the
    // aggregation loop observe the channel closing once they finish.
    drop(key_tx);
    drop(cancel_rx);

    // Aggregation: single consumer of every worker's output.
    while let Some(key) = key_rx.recv().await {
        store.increment(&key);
    }

    discovery.await?;

    let mut first_error = None;
    for worker in workers {
        if let Err(err) = worker.await? {
            warn!(error = %err, "extraction worker failed");
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
