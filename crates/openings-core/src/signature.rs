//! Canonical position signatures.

use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode};

use crate::outcome::Outcome;

/// Canonical signature for a position: board placement, side to move and
/// castling rights, space-separated.
///
/// The en-passant square and move counters are deliberately dropped so
/// that different move orders reaching the same placement, turn and
/// rights collapse onto one signature. The FEN
/// board alphabet never contains a space, so distinct triples can never
/// collide through the delimiter.
pub fn position_signature(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}

/// Index key for one observed (position, outcome) pair:
/// `"<board> <turn> <castling> <result>"`.
pub fn index_key(pos: &Chess, outcome: Outcome) -> String {
    format!("{} {}", position_signature(pos), outcome.label())
}
