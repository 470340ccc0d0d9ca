//! Historical outcome lookup for a single position.

use std::collections::BTreeMap;

use shakmaty::Chess;

use openings_core::{position_signature, Outcome};

/// Outcome distribution observed at one position signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupReport {
    pub white_wins: u64,
    pub draws: u64,
    pub black_wins: u64,
}

impl LookupReport {
    pub fn total_games(&self) -> u64 {
        self.white_wins + self.draws + self.black_wins
    }

    /// Share of games with this outcome, as a percentage. An all-zero
    /// report is 0% across the board, never NaN.
    pub fn percent(&self, outcome: Outcome) -> f64 {
        let total = self.total_games();
        if total == 0 {
            return 0.0;
        }
        let count = match outcome {
            Outcome::WhiteWin => self.white_wins,
            Outcome::Draw => self.draws,
            Outcome::BlackWin => self.black_wins,
        };
        100.0 * count as f64 / total as f64
    }
}

/// Look up the historical outcome distribution for `pos`.
///
/// Returns `None` when no indexed game reached this signature. That is a
/// normal result, distinct from any error.
pub fn lookup(pos: &Chess, index: &BTreeMap<String, u64>) -> Option<LookupReport> {
    let signature = position_signature(pos);
    let count = |outcome: Outcome| {
        let key = format!("{signature} {}", outcome.label());
        index.get(&key).copied().unwrap_or(0)
    };

    let report = LookupReport {
        white_wins: count(Outcome::WhiteWin),
        draws: count(Outcome::Draw),
        black_wins: count(Outcome::BlackWin),
    };

    (report.total_games() > 0).then_some(report)
}
