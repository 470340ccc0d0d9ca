//! Terminal game outcome classification.

/// Terminal classification of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    WhiteWin,
    Draw,
    BlackWin,
}

impl Outcome {
    /// All outcomes, in white/draw/black display order.
    pub const ALL: [Outcome; 3] = [Outcome::WhiteWin, Outcome::Draw, Outcome::BlackWin];

    /// Classify a PGN `Result` tag value.
    ///
    /// Ongoing, aborted and unknown results (`"*"` and anything else that
    /// is not one of the three terminal strings) return `None`; such games
    /// are excluded from indexing entirely.
    pub fn classify(raw: &str) -> Option<Outcome> {
        match raw {
            "1-0" => Some(Outcome::WhiteWin),
            "0-1" => Some(Outcome::BlackWin),
            "1/2-1/2" => Some(Outcome::Draw),
            _ => None,
        }
    }

    /// The PGN result string, used as the outcome component of index keys.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::WhiteWin => "1-0",
            Outcome::Draw => "1/2-1/2",
            Outcome::BlackWin => "0-1",
        }
    }
}
