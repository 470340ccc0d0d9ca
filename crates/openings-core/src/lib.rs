//! Pure chess logic for the openings index: position signatures, outcome
//! classification and per-game key extraction from PGN streams. No I/O
//! beyond reading the stream handed in.

pub mod extract;
pub mod outcome;
pub mod signature;

pub use extract::{extract_keys, ExtractError, FileKeys};
pub use outcome::Outcome;
pub use signature::{index_key, position_signature};
