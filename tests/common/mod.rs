use std::fs;
use std::path::Path;

use shakmaty::san::San;
use shakmaty::{Chess, Position};

/// Build a single PGN game with the given result tag and movetext.
pub fn pgn_game(result: &str, movetext: &str) -> String {
    format!(
        "[Event \"Test\"]\n[Site \"?\"]\n[Result \"{result}\"]\n\n{movetext} {result}\n\n"
    )
}

/// Write one corpus file holding the given games concatenated.
pub fn write_corpus_file(dir: &Path, name: &str, games: &[String]) {
    fs::write(dir.join(name), games.concat()).unwrap();
}

/// Replay SAN moves from the starting position.
pub fn play_moves(moves: &[&str]) -> Chess {
    let mut pos = Chess::default();
    for m in moves {
        let san: San = m.parse().unwrap();
        let mv = san.to_move(&pos).unwrap();
        pos = pos.play(mv).unwrap();
    }
    pos
}
