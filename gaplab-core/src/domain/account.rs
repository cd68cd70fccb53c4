//! Account parameters for a sizing run.
//!
//! `AccountConfig` is an immutable, validated value passed into the sizer.
//! It is built from `AccountParams` (the raw, deserializable form) and
//! derives `max_loss_per_trade` once at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BALANCE: f64 = 10_000.0;
pub const DEFAULT_RISK_FRACTION: f64 = 0.02;
pub const DEFAULT_PROFIT_CAPTURE_FRACTION: f64 = 0.8;

/// Invalid run parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite value > 0 (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be in (0, 1] (got {value})")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be a finite value >= 0 (got {value})")]
    NegativeThreshold { field: &'static str, value: f64 },
}

/// Raw account parameters, as they appear in config files and CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccountParams {
    /// Capital base in dollars.
    pub balance: f64,
    /// Fraction of balance risked per trade (0.02 = 2%).
    pub risk_fraction: f64,
    /// Fraction of the gap the strategy expects to capture; sets stop/target distance.
    pub profit_capture_fraction: f64,
}

impl Default for AccountParams {
    fn default() -> Self {
        Self {
            balance: DEFAULT_BALANCE,
            risk_fraction: DEFAULT_RISK_FRACTION,
            profit_capture_fraction: DEFAULT_PROFIT_CAPTURE_FRACTION,
        }
    }
}

/// Validated account parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AccountParams", into = "AccountParams")]
pub struct AccountConfig {
    balance: f64,
    risk_fraction: f64,
    profit_capture_fraction: f64,
    max_loss_per_trade: f64,
}

impl AccountConfig {
    pub fn new(
        balance: f64,
        risk_fraction: f64,
        profit_capture_fraction: f64,
    ) -> Result<Self, ConfigError> {
        if !(balance.is_finite() && balance > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "balance",
                value: balance,
            });
        }
        check_fraction("risk_fraction", risk_fraction)?;
        check_fraction("profit_capture_fraction", profit_capture_fraction)?;

        Ok(Self {
            balance,
            risk_fraction,
            profit_capture_fraction,
            max_loss_per_trade: balance * risk_fraction,
        })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn risk_fraction(&self) -> f64 {
        self.risk_fraction
    }

    pub fn profit_capture_fraction(&self) -> f64 {
        self.profit_capture_fraction
    }

    /// Dollar risk budget per trade: `balance * risk_fraction`.
    pub fn max_loss_per_trade(&self) -> f64 {
        self.max_loss_per_trade
    }

    /// Raw parameters, e.g. for applying overrides before re-validating.
    pub fn params(&self) -> AccountParams {
        AccountParams {
            balance: self.balance,
            risk_fraction: self.risk_fraction,
            profit_capture_fraction: self.profit_capture_fraction,
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            balance: DEFAULT_BALANCE,
            risk_fraction: DEFAULT_RISK_FRACTION,
            profit_capture_fraction: DEFAULT_PROFIT_CAPTURE_FRACTION,
            max_loss_per_trade: DEFAULT_BALANCE * DEFAULT_RISK_FRACTION,
        }
    }
}

impl TryFrom<AccountParams> for AccountConfig {
    type Error = ConfigError;

    fn try_from(params: AccountParams) -> Result<Self, Self::Error> {
        Self::new(
            params.balance,
            params.risk_fraction,
            params.profit_capture_fraction,
        )
    }
}

impl From<AccountConfig> for AccountParams {
    fn from(config: AccountConfig) -> Self {
        config.params()
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field, value })
    }
}
