//! Gap candidate: one row of the daily gap list.

use serde::{Deserialize, Serialize};

use super::Ticker;

/// A stock that gapped at the open, as read from the daily list.
///
/// `gap_percent` is a decimal fraction (0.034 = 3.4%) and may be negative.
/// `line` is the 1-based source line the candidate came from, or 0 when the
/// candidate was built in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ticker: Ticker,
    pub gap_percent: f64,
    pub opening_price: f64,
    #[serde(default)]
    pub line: u64,
}

impl Candidate {
    pub fn new(ticker: impl Into<Ticker>, gap_percent: f64, opening_price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            gap_percent,
            opening_price,
            line: 0,
        }
    }

    /// Attach the source line this candidate was parsed from.
    pub fn at_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }

    /// Absolute gap magnitude.
    pub fn abs_gap(&self) -> f64 {
        self.gap_percent.abs()
    }
}
