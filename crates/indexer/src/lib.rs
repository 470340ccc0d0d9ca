//! Corpus indexing engine for historical chess opening statistics.
//!
//! Walks a directory of PGN transcript files, derives a canonical
//! signature for every position reached within the opening phase of each
//! finished game, and counts how often each (signature, outcome) pair was
//! observed. Indexing runs either single-threaded ([`sequential`]) or as
//! a producer/workers/aggregator pipeline ([`pipeline`]); both produce
//! identical counts. The finished index is persisted as a JSON mapping
//! ([`persist`]) and queried per position ([`lookup`]).

pub mod config;
pub mod corpus;
pub mod error;
pub mod fetch;
pub mod lookup;
pub mod persist;
pub mod pipeline;
pub mod sample;
pub mod sequential;
pub mod store;

pub use error::IndexError;
pub use store::PositionIndex;
