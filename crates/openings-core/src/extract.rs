//! Per-game index key extraction from PGN streams.
//!
//! Both indexer modes feed files through [`extract_keys`]; sharing the
//! visitor is what guarantees the concurrent pipeline emits exactly the
//! keys the sequential walk does, whatever the worker count.

use std::io::Read;
use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Visitor};
use shakmaty::{Chess, Position};
use thiserror::Error;

use crate::outcome::Outcome;
use crate::signature::index_key;

/// Extraction failure for a single PGN stream.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The stream is not a well-formed transcript: a SAN token that is
    /// illegal in the position it is applied to, or a game declaring a
    /// non-standard starting position.
    #[error("malformed game {game}: {reason}")]
    MalformedGame { game: u64, reason: String },
}

/// Keys extracted from one PGN stream, with counters for logging.
#[derive(Debug, Default)]
pub struct FileKeys {
    /// One `(signature, outcome)` key per indexed position, in play order.
    pub keys: Vec<String>,
    /// Games encountered in the stream.
    pub games_seen: u64,
    /// Games that classified to a terminal outcome and were indexed.
    pub games_indexed: u64,
}

/// Tags collected during header parsing.
#[derive(Default)]
struct GameTags {
    outcome: Option<Outcome>,
    nonstandard_start: bool,
}

/// Replay state during movetext parsing.
struct GameState {
    board: Chess,
    outcome: Outcome,
    indexed: usize,
}

/// Visitor that emits one index key per position reached within the
/// depth bound of each classified game.
struct KeyCollector {
    max_positions: usize,
    out: FileKeys,
    malformed: Option<String>,
}

impl KeyCollector {
    fn new(depth_bound: usize) -> Self {
        Self {
            // One ply per side per move pair.
            max_positions: depth_bound * 2,
            out: FileKeys::default(),
            malformed: None,
        }
    }
}

impl Visitor for KeyCollector {
    type Tags = GameTags;
    type Movetext = GameState;
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<(), GameTags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(&mut self, tags: &mut GameTags, name: &[u8], value: RawTag<'_>) -> ControlFlow<()> {
        match name {
            b"Result" => {
                tags.outcome = Outcome::classify(value.decode_utf8_lossy().as_ref());
            }
            b"SetUp" | b"FEN" => {
                tags.nonstandard_start = true;
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameTags) -> ControlFlow<(), GameState> {
        self.out.games_seen += 1;

        if tags.nonstandard_start {
            self.malformed = Some("game declares a non-standard starting position".to_string());
            return ControlFlow::Break(());
        }

        // Unclassifiable games are skipped whole: none of their positions
        // reach the index, not even the early ones.
        let Some(outcome) = tags.outcome else {
            return ControlFlow::Break(());
        };

        self.out.games_indexed += 1;

        ControlFlow::Continue(GameState {
            board: Chess::default(),
            outcome,
            indexed: 0,
        })
    }

    fn san(&mut self, state: &mut GameState, san_plus: SanPlus) -> ControlFlow<()> {
        if state.indexed >= self.max_positions {
            return ControlFlow::Continue(());
        }

        let mv = match san_plus.san.to_move(&state.board) {
            Ok(mv) => mv,
            Err(err) => {
                self.malformed = Some(format!(
                    "{} at half-move {}: {err}",
                    san_plus.san,
                    state.indexed + 1
                ));
                return ControlFlow::Break(());
            }
        };

        state.board = match state.board.clone().play(mv) {
            Ok(board) => board,
            Err(err) => {
                self.malformed = Some(format!(
                    "{} at half-move {}: {err}",
                    san_plus.san,
                    state.indexed + 1
                ));
                return ControlFlow::Break(());
            }
        };

        self.out.keys.push(index_key(&state.board, state.outcome));
        state.indexed += 1;

        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _state: GameState) {}
}

/// Extract index keys for every classified game in a PGN stream.
///
/// Each game contributes one key per position it reached within its
/// first `2 * depth_bound` half-moves; games whose `Result` tag does not
/// classify contribute nothing. The first malformed game aborts the
/// whole stream; the corpus is assumed well-formed.
pub fn extract_keys<R: Read>(reader: R, depth_bound: usize) -> Result<FileKeys, ExtractError> {
    let mut collector = KeyCollector::new(depth_bound);
    let mut pgn_reader = Reader::new(reader);

    while pgn_reader.read_game(&mut collector)?.is_some() {
        if let Some(reason) = collector.malformed.take() {
            return Err(ExtractError::MalformedGame {
                game: collector.out.games_seen,
                reason,
            });
        }
    }

    Ok(collector.out)
}

#[cfg(test)]
mod tests {
    use shakmaty::san::San;

    use super::*;
    use crate::signature::position_signature;

    fn game(result: &str, movetext: &str) -> String {
        format!("[Event \"Test\"]\n[Result \"{result}\"]\n\n{movetext} {result}\n\n")
    }

    fn play_moves(moves: &[&str]) -> Chess {
        let mut pos = Chess::default();
        for m in moves {
            let san: San = m.parse().unwrap();
            let mv = san.to_move(&pos).unwrap();
            pos = pos.play(mv).unwrap();
        }
        pos
    }

    #[test]
    fn test_one_key_per_half_move_within_bound() {
        let pgn = game("1-0", "1. e4 e5 2. Nf3 Nc6");
        let keys = extract_keys(pgn.as_bytes(), 10).unwrap();

        assert_eq!(keys.games_seen, 1);
        assert_eq!(keys.games_indexed, 1);
        assert_eq!(keys.keys.len(), 4);
        assert_eq!(
            keys.keys[0],
            format!("{} 1-0", position_signature(&play_moves(&["e4"])))
        );
        assert_eq!(
            keys.keys[3],
            format!(
                "{} 1-0",
                position_signature(&play_moves(&["e4", "e5", "Nf3", "Nc6"]))
            )
        );
    }

    #[test]
    fn test_depth_bound_truncates_long_games() {
        let pgn = game("0-1", "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6");
        let keys = extract_keys(pgn.as_bytes(), 1).unwrap();
        // One move pair = two half-moves.
        assert_eq!(keys.keys.len(), 2);
    }

    #[test]
    fn test_depth_zero_indexes_nothing() {
        let pgn = game("1-0", "1. e4 e5");
        let keys = extract_keys(pgn.as_bytes(), 0).unwrap();
        assert!(keys.keys.is_empty());
        assert_eq!(keys.games_indexed, 1);
    }

    #[test]
    fn test_unclassified_game_contributes_no_keys() {
        let pgn = game("*", "1. e4 e5 2. Nf3");
        let keys = extract_keys(pgn.as_bytes(), 10).unwrap();
        assert_eq!(keys.games_seen, 1);
        assert_eq!(keys.games_indexed, 0);
        assert!(keys.keys.is_empty());
    }

    #[test]
    fn test_multiple_games_accumulate() {
        let pgn = format!(
            "{}{}{}",
            game("1-0", "1. e4 e5"),
            game("*", "1. d4 d5"),
            game("1/2-1/2", "1. c4")
        );
        let keys = extract_keys(pgn.as_bytes(), 10).unwrap();
        assert_eq!(keys.games_seen, 3);
        assert_eq!(keys.games_indexed, 2);
        assert_eq!(keys.keys.len(), 3);
    }

    #[test]
    fn test_illegal_move_is_malformed() {
        let pgn = game("1-0", "1. e5 e4");
        let err = extract_keys(pgn.as_bytes(), 10).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedGame { game: 1, .. }));
    }

    #[test]
    fn test_nonstandard_start_is_malformed() {
        let pgn = "[Event \"Test\"]\n[Result \"1-0\"]\n[SetUp \"1\"]\n[FEN \"8/8/8/8/8/8/8/K1k5 w - - 0 1\"]\n\n1. Ka2 1-0\n\n";
        let err = extract_keys(pgn.as_bytes(), 10).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedGame { .. }));
    }

    #[test]
    fn test_empty_stream_is_empty() {
        let keys = extract_keys(&b""[..], 10).unwrap();
        assert_eq!(keys.games_seen, 0);
        assert!(keys.keys.is_empty());
    }
}
