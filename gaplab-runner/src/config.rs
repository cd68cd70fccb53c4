//! Serializable run configuration.
//!
//! Loaded from TOML; every section is optional and falls back to defaults:
//!
//! ```toml
//! [account]
//! balance = 10000.0
//! risk_fraction = 0.02
//! profit_capture_fraction = 0.8
//!
//! [filter]
//! max_abs_gap = 0.10
//!
//! [load]
//! policy = "strict"
//! ```

use std::path::{Path, PathBuf};

use gaplab_core::{AccountConfig, GapFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loader::LoadPolicy;

/// Unique identifier for a run configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] gaplab_core::ConfigError),
}

/// Everything needed to reproduce a sizing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub account: AccountConfig,
    pub filter: GapFilter,
    pub load: LoadConfig,
}

/// Loader settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    pub policy: LoadPolicy,
}

impl RunConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Account values are validated on construction; the filter is checked here.
    pub fn validate(&self) -> Result<(), gaplab_core::ConfigError> {
        self.filter.validate()
    }

    /// Deterministic hash of the parameters that affect sizing output.
    ///
    /// Two runs with identical parameters share a RunId.
    pub fn run_id(&self) -> RunId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.account.balance().to_le_bytes());
        hasher.update(&self.account.risk_fraction().to_le_bytes());
        hasher.update(&self.account.profit_capture_fraction().to_le_bytes());
        hasher.update(&self.filter.max_abs_gap.to_le_bytes());
        hasher.update(match self.load.policy {
            LoadPolicy::Strict => b"strict".as_slice(),
            LoadPolicy::SkipMalformed => b"skip_malformed".as_slice(),
        });
        hasher.finalize().to_hex().to_string()
    }
}
