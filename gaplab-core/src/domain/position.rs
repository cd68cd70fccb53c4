//! Sized position and per-ticker selection.

use serde::{Deserialize, Serialize};

use super::Ticker;

/// A fixed-risk position sized for one candidate.
///
/// Prices and profit are rounded to cents. `shares` is the largest count
/// whose distance-to-stop risk fits the per-trade budget, measured both at
/// the exact stop and at the quoted (rounded) one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_price: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub shares: u64,
    /// Projected profit if the take-profit is hit.
    pub profit: f64,
}

impl Position {
    /// Dollar risk at the rounded stop: `shares * |stop - entry|`.
    ///
    /// For a gap-fade position this never exceeds `max_loss_per_trade`.
    pub fn dollar_risk(&self) -> f64 {
        self.shares as f64 * (self.stop_loss_price - self.entry_price).abs()
    }
}

/// Final pipeline output unit: a ticker and its sized position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub ticker: Ticker,
    #[serde(flatten)]
    pub position: Position,
}

impl Selection {
    pub fn new(ticker: impl Into<Ticker>, position: Position) -> Self {
        Self {
            ticker: ticker.into(),
            position,
        }
    }
}
