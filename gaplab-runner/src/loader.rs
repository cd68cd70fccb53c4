//! Candidate loading from the daily gap list.
//!
//! Input is comma-separated with a header row that is always discarded:
//!
//! ```text
//! ticker,gap,openingPrice
//! AAPL,0.034,172.50
//! ```
//!
//! Under `LoadPolicy::Strict` the first malformed row aborts the load and no
//! candidates are returned. Under `LoadPolicy::SkipMalformed` bad rows are
//! skipped and reported as diagnostics. I/O failures are always fatal.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use gaplab_core::Candidate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected column names, in order. Header content itself is not checked.
pub const COLUMNS: [&str; 3] = ["ticker", "gap", "openingPrice"];

/// What to do with a row that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Abort the whole load on the first malformed row.
    #[default]
    Strict,
    /// Skip malformed rows and collect a diagnostic for each.
    SkipMalformed,
}

/// A row that failed to parse: where, which column, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    /// 1-based line in the source (the header is line 1).
    pub line: u64,
    pub column: String,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column '{}': {} (value: {:?})",
            self.line, self.column, self.reason, self.value
        )
    }
}

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input at {0}")]
    MalformedInput(RowDiagnostic),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Loaded candidates plus any rows skipped along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedCandidates {
    pub candidates: Vec<Candidate>,
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Load candidates from a CSV file.
pub fn load_candidates(path: &Path, policy: LoadPolicy) -> Result<LoadedCandidates, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_candidates(bytes.as_slice(), policy)
}

/// Parse candidates from any reader. The first row is always treated as a header.
pub fn parse_candidates<R: Read>(
    reader: R,
    policy: LoadPolicy,
) -> Result<LoadedCandidates, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut loaded = LoadedCandidates::default();

    for result in rdr.records() {
        let parsed = match result {
            Ok(record) => parse_record(&record),
            Err(e) => match utf8_diagnostic(&e) {
                Some(diag) => Err(diag),
                None => return Err(e.into()),
            },
        };

        match parsed {
            Ok(candidate) => loaded.candidates.push(candidate),
            Err(diag) => match policy {
                LoadPolicy::Strict => return Err(LoadError::MalformedInput(diag)),
                LoadPolicy::SkipMalformed => {
                    tracing::warn!("skipping malformed row: {diag}");
                    loaded.diagnostics.push(diag);
                }
            },
        }
    }

    Ok(loaded)
}

/// Invalid UTF-8 is a per-row problem; any other CSV error is fatal.
fn utf8_diagnostic(error: &csv::Error) -> Option<RowDiagnostic> {
    match error.kind() {
        csv::ErrorKind::Utf8 { pos, err } => Some(RowDiagnostic {
            line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
            column: "record".into(),
            value: String::new(),
            reason: format!("invalid UTF-8: {err}"),
        }),
        _ => None,
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<Candidate, RowDiagnostic> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    if record.len() != COLUMNS.len() {
        return Err(RowDiagnostic {
            line,
            column: "record".into(),
            value: record.iter().collect::<Vec<_>>().join(","),
            reason: format!(
                "expected {} fields, found {}",
                COLUMNS.len(),
                record.len()
            ),
        });
    }

    let ticker = &record[0];
    if ticker.is_empty() {
        return Err(RowDiagnostic {
            line,
            column: COLUMNS[0].into(),
            value: String::new(),
            reason: "ticker is empty".into(),
        });
    }

    let gap = parse_number(&record[1], COLUMNS[1], line)?;
    let opening_price = parse_number(&record[2], COLUMNS[2], line)?;

    Ok(Candidate::new(ticker, gap, opening_price).at_line(line))
}

fn parse_number(field: &str, column: &str, line: u64) -> Result<f64, RowDiagnostic> {
    let diag = |reason: String| RowDiagnostic {
        line,
        column: column.into(),
        value: field.into(),
        reason,
    };

    let value: f64 = field
        .parse()
        .map_err(|e: std::num::ParseFloatError| diag(e.to_string()))?;
    if !value.is_finite() {
        return Err(diag("not a finite number".into()));
    }
    Ok(value)
}

/// Compute a deterministic BLAKE3 hash over loaded candidates.
///
/// Covers ticker, gap, and opening price in input order, so the same list
/// always fingerprints the same regardless of file formatting.
pub fn dataset_hash(candidates: &[Candidate]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in candidates {
        hasher.update(c.ticker.as_bytes());
        hasher.update(&[0]);
        hasher.update(&c.gap_percent.to_le_bytes());
        hasher.update(&c.opening_price.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str, policy: LoadPolicy) -> Result<LoadedCandidates, LoadError> {
        parse_candidates(input.as_bytes(), policy)
    }

    #[test]
    fn parses_rows_in_order() {
        let input = "ticker,gap,openingPrice\nAAPL,0.034,172.50\nMSFT,-0.02,410.10\n";
        let loaded = parse(input, LoadPolicy::Strict).unwrap();

        assert_eq!(loaded.candidates.len(), 2);
        assert_eq!(loaded.candidates[0].ticker, "AAPL");
        assert_eq!(loaded.candidates[0].gap_percent, 0.034);
        assert_eq!(loaded.candidates[0].opening_price, 172.50);
        assert_eq!(loaded.candidates[0].line, 2);
        assert_eq!(loaded.candidates[1].ticker, "MSFT");
        assert_eq!(loaded.candidates[1].gap_percent, -0.02);
        assert_eq!(loaded.candidates[1].line, 3);
        assert!(loaded.diagnostics.is_empty());
    }

    #[test]
    fn header_is_discarded_regardless_of_content() {
        let input = "AAPL,0.01,100.0\nMSFT,0.02,200.0\n";
        let loaded = parse(input, LoadPolicy::Strict).unwrap();
        assert_eq!(loaded.candidates.len(), 1);
        assert_eq!(loaded.candidates[0].ticker, "MSFT");
    }

    #[test]
    fn header_only_is_empty_not_error() {
        let loaded = parse("ticker,gap,openingPrice\n", LoadPolicy::Strict).unwrap();
        assert!(loaded.candidates.is_empty());

        let loaded = parse("", LoadPolicy::Strict).unwrap();
        assert!(loaded.candidates.is_empty());
    }

    #[test]
    fn unparseable_gap_aborts_strict_load() {
        let input = "ticker,gap,openingPrice\nAAPL,0.034,172.50\nBAD,N/A,10.0\nMSFT,0.01,400\n";
        let err = parse(input, LoadPolicy::Strict).unwrap_err();

        match err {
            LoadError::MalformedInput(diag) => {
                assert_eq!(diag.line, 3);
                assert_eq!(diag.column, "gap");
                assert_eq!(diag.value, "N/A");
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_price_names_price_column() {
        let input = "ticker,gap,openingPrice\nAAPL,0.034,abc\n";
        let err = parse(input, LoadPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedInput(RowDiagnostic { ref column, line: 2, .. }) if column == "openingPrice"
        ));
        assert!(err.to_string().contains("openingPrice"));
    }

    #[test]
    fn non_finite_values_are_malformed() {
        for bad in ["NaN", "inf", "-infinity"] {
            let input = format!("ticker,gap,openingPrice\nX,{bad},10.0\n");
            assert!(matches!(
                parse(&input, LoadPolicy::Strict),
                Err(LoadError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let input = "ticker,gap,openingPrice\nAAPL,0.034\n";
        let err = parse(input, LoadPolicy::Strict).unwrap_err();
        match err {
            LoadError::MalformedInput(diag) => {
                assert_eq!(diag.column, "record");
                assert_eq!(diag.line, 2);
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn empty_ticker_is_malformed() {
        let input = "ticker,gap,openingPrice\n,0.01,10.0\n";
        let err = parse(input, LoadPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedInput(RowDiagnostic { ref column, .. }) if column == "ticker"
        ));
    }

    #[test]
    fn whitespace_is_trimmed() {
        let input = "ticker, gap, openingPrice\n AAPL , 0.034 , 172.50 \n";
        let loaded = parse(input, LoadPolicy::Strict).unwrap();
        assert_eq!(loaded.candidates[0].ticker, "AAPL");
        assert_eq!(loaded.candidates[0].opening_price, 172.50);
    }

    #[test]
    fn skip_policy_collects_diagnostics() {
        let input = "ticker,gap,openingPrice\nAAPL,0.034,172.50\nBAD,N/A,10.0\nMSFT,0.01,400\nWORSE,0.01\n";
        let loaded = parse(input, LoadPolicy::SkipMalformed).unwrap();

        let tickers: Vec<_> = loaded.candidates.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(loaded.diagnostics.len(), 2);
        assert_eq!(loaded.diagnostics[0].line, 3);
        assert_eq!(loaded.diagnostics[0].column, "gap");
        assert_eq!(loaded.diagnostics[1].line, 5);
        assert_eq!(loaded.diagnostics[1].column, "record");
    }

    #[test]
    fn invalid_utf8_row_is_malformed_record() {
        let input = &b"ticker,gap,openingPrice\nA\xff,0.01,10\nMSFT,0.01,400\n"[..];

        let err = parse_candidates(input, LoadPolicy::Strict).unwrap_err();
        match err {
            LoadError::MalformedInput(diag) => {
                assert_eq!(diag.line, 2);
                assert_eq!(diag.column, "record");
                assert!(diag.reason.contains("UTF-8"));
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }

        let loaded = parse_candidates(input, LoadPolicy::SkipMalformed).unwrap();
        assert_eq!(loaded.candidates.len(), 1);
        assert_eq!(loaded.candidates[0].ticker, "MSFT");
        assert_eq!(loaded.candidates[0].line, 3);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].line, 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_candidates(Path::new("/nonexistent/opg.csv"), LoadPolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("opg.csv"));
    }

    #[test]
    fn dataset_hash_is_deterministic_and_content_sensitive() {
        let a = vec![Candidate::new("AAPL", 0.034, 172.50)];
        let b = vec![Candidate::new("AAPL", 0.035, 172.50)];
        assert_eq!(dataset_hash(&a), dataset_hash(&a.clone()));
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
        assert_eq!(dataset_hash(&a).len(), 64);
    }
}
