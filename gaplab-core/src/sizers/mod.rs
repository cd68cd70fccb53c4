//! Position Sizers: turn a gap candidate into a sized position.
//!
//! Sizers translate a per-trade risk budget into entry, stop, target, and
//! share count. They see one candidate at a time and hold no run state.

pub mod gap_fade;

pub use gap_fade::{gap_levels, size_position, GapFadeSizer, GapLevels};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Candidate, Position};

/// Why a candidate could not be sized.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizingError {
    /// Inputs outside the domain of the sizing math.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Zero distance between entry and stop; share count is undefined.
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },
}

/// Position sizing logic
///
/// # Responsibilities
/// - Convert candidate + account parameters → entry, stop, target, shares
/// - Keep worst-case loss within the per-trade risk budget
///
/// # Non-Responsibilities
/// - Sizers do NOT decide which candidates to trade (that's the filter's job)
/// - Sizers do NOT place orders
pub trait Sizer: Send + Sync {
    fn size(&self, candidate: &Candidate) -> Result<Position, SizingError>;

    /// Sizer name for reports/logging
    fn name(&self) -> &str;
}

/// Round to cents, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
