//! Pipeline driver: Loader → Filter → Sizer.
//!
//! A load failure aborts the run. Per-candidate sizing failures are collected
//! as rejections and the remaining candidates are still sized. Candidates
//! dropped by the gap filter are kept in the report so nothing disappears
//! silently.

use std::path::Path;

use gaplab_core::{Candidate, GapFadeSizer, Selection, Sizer, SizingError};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::loader::{dataset_hash, load_candidates, LoadError, RowDiagnostic};

/// Schema version for persisted run reports.
pub const SCHEMA_VERSION: u32 = 1;

/// A candidate that survived the filter but could not be sized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub ticker: String,
    /// Source line of the candidate (0 when built in memory).
    pub line: u64,
    pub error: SizingError,
}

/// A candidate removed by the gap filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredCandidate {
    pub ticker: String,
    pub line: u64,
    pub gap_percent: f64,
}

impl From<Candidate> for FilteredCandidate {
    fn from(c: Candidate) -> Self {
        Self {
            ticker: c.ticker,
            line: c.line,
            gap_percent: c.gap_percent,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: u32,
    pub run_id: String,
    pub config: RunConfig,
    /// BLAKE3 hash over the loaded candidates.
    pub dataset_hash: String,
    /// Candidates loaded (after skipping malformed rows, if enabled).
    pub candidate_count: usize,
    /// Sized positions, in input order.
    pub selections: Vec<Selection>,
    pub rejections: Vec<Rejection>,
    pub filtered_out: Vec<FilteredCandidate>,
    /// Rows skipped by the loader under `skip_malformed`.
    pub load_diagnostics: Vec<RowDiagnostic>,
}

impl RunReport {
    /// Total projected profit across all selections.
    pub fn total_profit(&self) -> f64 {
        self.selections.iter().map(|s| s.position.profit).sum()
    }

    /// Total dollar risk at the rounded stops. Each gap-fade position keeps
    /// its own share within `max_loss_per_trade`.
    pub fn total_risk(&self) -> f64 {
        self.selections.iter().map(|s| s.position.dollar_risk()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty() && self.load_diagnostics.is_empty()
    }
}

/// Load candidates from `path` and run the pipeline.
pub fn run_from_path(path: &Path, config: &RunConfig) -> Result<RunReport, LoadError> {
    tracing::info!(path = %path.display(), policy = ?config.load.policy, "loading candidates");
    let loaded = load_candidates(path, config.load.policy)?;

    let mut report = run_pipeline(loaded.candidates, config);
    report.load_diagnostics = loaded.diagnostics;
    Ok(report)
}

/// Filter and size already-loaded candidates with the gap-fade sizer.
pub fn run_pipeline(candidates: Vec<Candidate>, config: &RunConfig) -> RunReport {
    let sizer = GapFadeSizer::new(config.account);
    run_with_sizer(candidates, config, &sizer)
}

/// Filter and size candidates with an arbitrary sizer.
pub fn run_with_sizer(
    candidates: Vec<Candidate>,
    config: &RunConfig,
    sizer: &dyn Sizer,
) -> RunReport {
    let filter = &config.filter;
    let candidate_count = candidates.len();
    let hash = dataset_hash(&candidates);

    let split = filter.partition(candidates);
    tracing::info!(
        loaded = candidate_count,
        retained = split.retained.len(),
        dropped = split.dropped.len(),
        max_abs_gap = filter.max_abs_gap,
        "applied gap filter"
    );
    for c in &split.dropped {
        tracing::debug!(ticker = %c.ticker, gap = c.gap_percent, "gap exceeds threshold");
    }

    let mut selections = Vec::with_capacity(split.retained.len());
    let mut rejections = Vec::new();

    for candidate in split.retained {
        match sizer.size(&candidate) {
            Ok(position) => {
                tracing::debug!(
                    ticker = %candidate.ticker,
                    shares = position.shares,
                    stop = position.stop_loss_price,
                    target = position.take_profit_price,
                    "sized"
                );
                selections.push(Selection::new(candidate.ticker, position));
            }
            Err(error) => {
                tracing::warn!(ticker = %candidate.ticker, line = candidate.line, "{error}");
                rejections.push(Rejection {
                    ticker: candidate.ticker,
                    line: candidate.line,
                    error,
                });
            }
        }
    }

    tracing::info!(
        sizer = sizer.name(),
        selections = selections.len(),
        rejections = rejections.len(),
        "sizing complete"
    );

    RunReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        config: config.clone(),
        dataset_hash: hash,
        candidate_count,
        selections,
        rejections,
        filtered_out: split.dropped.into_iter().map(FilteredCandidate::from).collect(),
        load_diagnostics: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaplab_core::{AccountConfig, GapFilter, Position};

    fn tickers(report: &RunReport) -> Vec<&str> {
        report.selections.iter().map(|s| s.ticker.as_str()).collect()
    }

    #[test]
    fn sizes_survivors_in_input_order() {
        let candidates = vec![
            Candidate::new("AAPL", 0.034, 172.50),
            Candidate::new("BIG", 0.25, 20.0),
            Candidate::new("MSFT", -0.02, 410.0),
        ];
        let report = run_pipeline(candidates, &RunConfig::default());

        assert_eq!(tickers(&report), vec!["AAPL", "MSFT"]);
        assert_eq!(report.selections[0].position.shares, 44);
        assert_eq!(report.candidate_count, 3);
        assert_eq!(report.filtered_out.len(), 1);
        assert_eq!(report.filtered_out[0].ticker, "BIG");
        assert!(report.rejections.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn sizing_failure_does_not_halt_batch() {
        let candidates = vec![
            Candidate::new("FLAT", 0.0, 50.0).at_line(2),
            Candidate::new("AAPL", 0.034, 172.50).at_line(3),
            Candidate::new("FREE", 0.01, 0.0).at_line(4),
        ];
        let report = run_pipeline(candidates, &RunConfig::default());

        assert_eq!(tickers(&report), vec!["AAPL"]);
        assert_eq!(report.rejections.len(), 2);
        assert_eq!(report.rejections[0].ticker, "FLAT");
        assert_eq!(report.rejections[0].line, 2);
        assert!(matches!(
            report.rejections[0].error,
            SizingError::DegenerateInput { .. }
        ));
        assert!(matches!(
            report.rejections[1].error,
            SizingError::InvalidInput { .. }
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn config_changes_sizing() {
        let mut config = RunConfig::default();
        config.account = AccountConfig::new(100_000.0, 0.02, 0.8).unwrap();
        let report = run_pipeline(vec![Candidate::new("AAPL", 0.034, 172.50)], &config);
        assert_eq!(report.selections[0].position.shares, 440);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = run_pipeline(Vec::new(), &RunConfig::default());
        assert!(report.selections.is_empty());
        assert_eq!(report.candidate_count, 0);
        assert_eq!(report.total_profit(), 0.0);
    }

    struct FixedSizer;

    impl Sizer for FixedSizer {
        fn size(&self, _candidate: &Candidate) -> Result<Position, SizingError> {
            Ok(Position {
                entry_price: 10.0,
                stop_loss_price: 9.0,
                take_profit_price: 11.0,
                shares: 10,
                profit: 10.0,
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn driver_accepts_any_sizer() {
        let mut config = RunConfig::default();
        config.filter = GapFilter::new(1.0).unwrap();
        let candidates = vec![
            Candidate::new("A", 0.5, 10.0),
            Candidate::new("B", 0.01, 10.0),
        ];
        let report = run_with_sizer(candidates, &config, &FixedSizer);

        assert_eq!(report.selections.len(), 2);
        assert_eq!(report.total_profit(), 20.0);
        assert_eq!(report.total_risk(), 20.0);
    }
}
