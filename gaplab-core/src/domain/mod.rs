//! Domain types for GapLab

pub mod account;
pub mod candidate;
pub mod position;

pub use account::{AccountConfig, AccountParams, ConfigError};
pub use candidate::Candidate;
pub use position::{Position, Selection};

/// Ticker symbol type alias
pub type Ticker = String;
