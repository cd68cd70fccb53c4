//! Gap-Fade Sizer
//!
//! Fixed-risk sizing for a stock that gapped at the open. The implied prior
//! close sets the gap's dollar size; a fraction of it becomes the distance
//! from the open to both the stop and the target.

use crate::domain::{AccountConfig, Candidate, Position};
use crate::sizers::{round2, Sizer, SizingError};

/// Unrounded price levels derived from a gap.
///
/// # Formula
/// ```text
/// closing_price   = opening_price / (1 + gap_percent)
/// gap_value       = closing_price - opening_price
/// profit_from_gap = gap_value * profit_capture_fraction
/// stop_loss       = opening_price - profit_from_gap
/// take_profit     = opening_price + profit_from_gap
/// risk_per_share  = |stop_loss - opening_price|
/// ```
///
/// Stop and target are symmetric around the open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapLevels {
    pub closing_price: f64,
    pub gap_value: f64,
    pub profit_from_gap: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_per_share: f64,
}

/// Compute the unrounded levels for a gap.
///
/// Fails with `InvalidInput` when the gap is -100% or worse (the implied
/// close would be infinite or negative), when any input is non-finite, or
/// when the opening price is not positive.
pub fn gap_levels(
    gap_percent: f64,
    opening_price: f64,
    profit_capture_fraction: f64,
) -> Result<GapLevels, SizingError> {
    if !gap_percent.is_finite() {
        return Err(invalid(format!("gap {gap_percent} is not a finite number")));
    }
    if !opening_price.is_finite() || opening_price <= 0.0 {
        return Err(invalid(format!(
            "opening price must be a finite value > 0 (got {opening_price})"
        )));
    }
    if gap_percent == -1.0 {
        return Err(invalid(
            "gap of -100% divides by zero in the implied prior close".to_string(),
        ));
    }
    if gap_percent < -1.0 {
        return Err(invalid(format!(
            "gap {gap_percent} implies a negative prior close"
        )));
    }

    let closing_price = opening_price / (1.0 + gap_percent);
    let gap_value = closing_price - opening_price;
    let profit_from_gap = gap_value * profit_capture_fraction;

    let stop_loss = opening_price - profit_from_gap;
    let take_profit = opening_price + profit_from_gap;
    let risk_per_share = (stop_loss - opening_price).abs();

    Ok(GapLevels {
        closing_price,
        gap_value,
        profit_from_gap,
        stop_loss,
        take_profit,
        risk_per_share,
    })
}

/// Size a fixed-risk position for one gap.
///
/// # Example
/// - Gap: +3.4%, open $172.50 → implied close $166.83
/// - Capture 80% of the $5.67 gap → $4.54 from open to stop and target
/// - Risk budget: 2% of $10,000 = $200
/// - Shares: floor($200 / $4.54) = 44
pub fn size_position(
    gap_percent: f64,
    opening_price: f64,
    account: &AccountConfig,
) -> Result<Position, SizingError> {
    let levels = gap_levels(
        gap_percent,
        opening_price,
        account.profit_capture_fraction(),
    )?;

    if levels.risk_per_share == 0.0 {
        return Err(SizingError::DegenerateInput {
            reason: format!(
                "gap {gap_percent} leaves zero distance between entry and stop; share count is undefined"
            ),
        });
    }
    if levels.stop_loss <= 0.0 || levels.take_profit <= 0.0 {
        return Err(invalid(format!(
            "derived stop {:.4} / target {:.4} must both be positive",
            levels.stop_loss, levels.take_profit
        )));
    }

    let entry_price = round2(opening_price);
    let stop_loss_price = round2(levels.stop_loss);
    let quoted_risk = (stop_loss_price - entry_price).abs();

    let shares = max_shares(
        account.max_loss_per_trade(),
        levels.risk_per_share,
        quoted_risk,
    );
    let profit = (opening_price - levels.take_profit).abs() * shares as f64;

    Ok(Position {
        entry_price,
        stop_loss_price,
        take_profit_price: round2(levels.take_profit),
        shares,
        profit: round2(profit),
    })
}

/// Largest share count that fits the budget at both the exact and the
/// cent-rounded stop distance.
///
/// The exact distance sets the usual `floor(max_loss / risk)` count. When
/// rounding pushes the quoted stop further from the entry, the count drops
/// so that `Position::dollar_risk` also stays within `max_loss`.
fn max_shares(max_loss: f64, risk_per_share: f64, quoted_risk: f64) -> u64 {
    let shares = floor_shares(max_loss, risk_per_share);
    if quoted_risk > 0.0 {
        shares.min(floor_shares(max_loss, quoted_risk))
    } else {
        shares
    }
}

/// Largest share count with `shares * risk <= max_loss`.
fn floor_shares(max_loss: f64, risk: f64) -> u64 {
    let mut shares = (max_loss / risk).floor();
    // The quotient can round up onto an integer; step back if so.
    while shares > 0.0 && shares * risk > max_loss {
        shares -= 1.0;
    }
    shares as u64
}

fn invalid(reason: String) -> SizingError {
    SizingError::InvalidInput { reason }
}

/// Gap-fade sizer bound to one account configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapFadeSizer {
    account: AccountConfig,
}

impl GapFadeSizer {
    pub fn new(account: AccountConfig) -> Self {
        Self { account }
    }
}

impl Sizer for GapFadeSizer {
    fn size(&self, candidate: &Candidate) -> Result<Position, SizingError> {
        size_position(candidate.gap_percent, candidate.opening_price, &self.account)
    }

    fn name(&self) -> &str {
        "GapFade"
    }
}
