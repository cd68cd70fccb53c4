//! Candidate filter: drops candidates whose gap is too large to fade.
//!
//! A candidate passes when `|gap_percent| <= max_abs_gap`. Filtering is pure,
//! preserves relative order, and never errors. A non-finite gap never passes.

use serde::{Deserialize, Serialize};

use crate::domain::{Candidate, ConfigError};

/// Default gap-magnitude threshold (10%).
pub const DEFAULT_MAX_ABS_GAP: f64 = 0.10;

/// Gap-magnitude filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GapFilter {
    pub max_abs_gap: f64,
}

impl GapFilter {
    pub fn new(max_abs_gap: f64) -> Result<Self, ConfigError> {
        let filter = Self { max_abs_gap };
        filter.validate()?;
        Ok(filter)
    }

    /// Threshold must be a finite, non-negative fraction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_abs_gap.is_finite() && self.max_abs_gap >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NegativeThreshold {
                field: "max_abs_gap",
                value: self.max_abs_gap,
            })
        }
    }

    pub fn partition(&self, candidates: Vec<Candidate>) -> GapPartition {
        partition_by_gap(candidates, self.max_abs_gap)
    }
}

impl Default for GapFilter {
    fn default() -> Self {
        Self {
            max_abs_gap: DEFAULT_MAX_ABS_GAP,
        }
    }
}

/// Result of splitting candidates by the gap threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapPartition {
    /// Candidates within the threshold, in input order.
    pub retained: Vec<Candidate>,
    /// Candidates over the threshold, in input order.
    pub dropped: Vec<Candidate>,
}

/// Keep candidates with `|gap_percent| <= threshold`, preserving order.
pub fn filter_by_gap(candidates: Vec<Candidate>, threshold: f64) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| within(c, threshold))
        .collect()
}

/// Split candidates into retained and dropped, both preserving order.
pub fn partition_by_gap(candidates: Vec<Candidate>, threshold: f64) -> GapPartition {
    let (retained, dropped) = candidates
        .into_iter()
        .partition(|c| within(c, threshold));
    GapPartition { retained, dropped }
}

/// NaN compares false, so a non-finite gap never passes.
fn within(candidate: &Candidate, threshold: f64) -> bool {
    candidate.abs_gap() <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.ticker.as_str()).collect()
    }

    #[test]
    fn keeps_small_gap_and_drops_large_one() {
        let candidates = vec![
            Candidate::new("SMALL", 0.05, 50.0),
            Candidate::new("LARGE", 0.15, 50.0),
        ];
        let kept = filter_by_gap(candidates, DEFAULT_MAX_ABS_GAP);
        assert_eq!(tickers(&kept), vec!["SMALL"]);
    }

    #[test]
    fn negative_gaps_use_magnitude() {
        let candidates = vec![
            Candidate::new("DOWN_SMALL", -0.05, 50.0),
            Candidate::new("DOWN_LARGE", -0.15, 50.0),
        ];
        let kept = filter_by_gap(candidates, 0.10);
        assert_eq!(tickers(&kept), vec!["DOWN_SMALL"]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let kept = filter_by_gap(vec![Candidate::new("EDGE", 0.10, 50.0)], 0.10);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn preserves_input_order() {
        let candidates = vec![
            Candidate::new("C", 0.01, 10.0),
            Candidate::new("X", 0.50, 10.0),
            Candidate::new("A", -0.02, 10.0),
            Candidate::new("B", 0.03, 10.0),
        ];
        let kept = filter_by_gap(candidates, 0.10);
        assert_eq!(tickers(&kept), vec!["C", "A", "B"]);
    }

    #[test]
    fn nan_gap_never_passes() {
        let kept = filter_by_gap(vec![Candidate::new("NAN", f64::NAN, 10.0)], 0.10);
        assert!(kept.is_empty());
    }

    #[test]
    fn partition_reports_dropped() {
        let candidates = vec![
            Candidate::new("A", 0.02, 10.0),
            Candidate::new("B", 0.20, 10.0),
            Candidate::new("C", -0.30, 10.0),
        ];
        let split = GapFilter::default().partition(candidates);
        assert_eq!(tickers(&split.retained), vec!["A"]);
        assert_eq!(tickers(&split.dropped), vec!["B", "C"]);
    }

    #[test]
    fn partition_and_filter_agree() {
        let candidates = vec![
            Candidate::new("A", 0.10, 10.0),
            Candidate::new("B", -0.11, 10.0),
            Candidate::new("C", f64::NAN, 10.0),
            Candidate::new("D", -0.03, 10.0),
        ];
        let kept = filter_by_gap(candidates.clone(), 0.10);
        let split = partition_by_gap(candidates, 0.10);
        assert_eq!(split.retained, kept);
        assert_eq!(tickers(&split.dropped), vec!["B", "C"]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(filter_by_gap(Vec::new(), 0.10).is_empty());
    }

    #[test]
    fn validate_rejects_bad_threshold() {
        assert!(GapFilter::new(-0.01).is_err());
        assert!(GapFilter::new(f64::NAN).is_err());
        assert!(GapFilter::new(0.0).is_ok());
    }
}
