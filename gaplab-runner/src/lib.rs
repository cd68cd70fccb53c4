//! GapLab Runner: candidate loading, run configuration, pipeline, export.
//!
//! This crate builds on `gaplab-core` to provide:
//! - CSV loading of the daily gap list with row-level error attribution
//! - TOML run configuration (account, filter threshold, load policy)
//! - The Loader → Filter → Sizer pipeline driver
//! - JSON/CSV report export and artifact bundles

pub mod config;
pub mod export;
pub mod loader;
pub mod pipeline;

pub use config::{ConfigError, LoadConfig, RunConfig, RunId};
pub use export::{
    export_json, export_rejections_csv, export_selections_csv, import_json, save_artifacts,
};
pub use loader::{
    dataset_hash, load_candidates, parse_candidates, LoadError, LoadPolicy, LoadedCandidates,
    RowDiagnostic,
};
pub use pipeline::{
    run_from_path, run_pipeline, run_with_sizer, FilteredCandidate, Rejection, RunReport,
    SCHEMA_VERSION,
};
