//! GapLab Core: domain types, gap filter, fixed-risk position sizing.
//!
//! This crate is pure computation with no I/O:
//! - Domain types (candidates, account parameters, positions, selections)
//! - Gap-magnitude candidate filter
//! - Gap-fade position sizer behind the `Sizer` trait

pub mod domain;
pub mod filter;
pub mod sizers;

pub use domain::{AccountConfig, AccountParams, Candidate, ConfigError, Position, Selection};
pub use filter::{filter_by_gap, partition_by_gap, GapFilter, GapPartition, DEFAULT_MAX_ABS_GAP};
pub use sizers::{gap_levels, round2, size_position, GapFadeSizer, GapLevels, Sizer, SizingError};
