//! Strategy configuration.
//!
//! One immutable value constructed at startup and passed into the
//! calculator; there are no ambient tunables. The three knobs that
//! historically spawned formula variants (volatility exponent,
//! microstructure term, inventory dead-band) are explicit fields here.

use cadence_core::{CoreError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Parameters of the unified quote calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Spread-scaling risk factor.
    #[serde(default = "default_risk_rate")]
    pub risk_rate: f64,

    /// Quantity submitted per leg per cycle.
    #[serde(default = "default_lot_size")]
    pub lot_size: Decimal,

    /// Inventory-normalization cap: how many lots of imbalance map to
    /// the full skew offset.
    #[serde(default = "default_max_inventory_multiple")]
    pub max_inventory_multiple: f64,

    /// Exponent mapping variance to the spread scale `d = variance^p`.
    /// Sub-linear (≈0.5–0.6) to dampen extreme volatility.
    #[serde(default = "default_volatility_exponent")]
    pub volatility_exponent: f64,

    /// Add the thin-liquidity penalty `2/traded · ln(1 + risk/resting)`
    /// to the spread.
    #[serde(default)]
    pub microstructure_enabled: bool,

    /// Inventory dead-band in lots: below this |net| the calculator
    /// signals "flatten" (cancel resting orders, skip re-quoting).
    /// `0.0` disables the dead-band.
    #[serde(default)]
    pub inventory_dead_band_lots: f64,

    /// Instrument price granularity; quoted prices floor to this grid.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
}

fn default_risk_rate() -> f64 {
    1.0
}

fn default_lot_size() -> Decimal {
    dec!(0.01)
}

fn default_max_inventory_multiple() -> f64 {
    4.0
}

fn default_volatility_exponent() -> f64 {
    0.55
}

fn default_tick_size() -> Decimal {
    Decimal::ONE
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            risk_rate: default_risk_rate(),
            lot_size: default_lot_size(),
            max_inventory_multiple: default_max_inventory_multiple(),
            volatility_exponent: default_volatility_exponent(),
            microstructure_enabled: false,
            inventory_dead_band_lots: 0.0,
            tick_size: default_tick_size(),
        }
    }
}

impl StrategyConfig {
    /// Reject configurations that would divide by zero or invert the
    /// volatility dampening.
    pub fn validate(&self) -> Result<()> {
        if !(self.risk_rate.is_finite() && self.risk_rate > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "risk_rate must be positive, got {}",
                self.risk_rate
            )));
        }
        if self.lot_size <= Decimal::ZERO {
            return Err(CoreError::InvalidConfig(format!(
                "lot_size must be positive, got {}",
                self.lot_size
            )));
        }
        if !(self.max_inventory_multiple.is_finite() && self.max_inventory_multiple > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "max_inventory_multiple must be positive, got {}",
                self.max_inventory_multiple
            )));
        }
        if !(self.volatility_exponent > 0.0 && self.volatility_exponent <= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "volatility_exponent must be in (0, 1], got {}",
                self.volatility_exponent
            )));
        }
        if self.inventory_dead_band_lots < 0.0 || !self.inventory_dead_band_lots.is_finite() {
            return Err(CoreError::InvalidConfig(format!(
                "inventory_dead_band_lots must be non-negative, got {}",
                self.inventory_dead_band_lots
            )));
        }
        if self.tick_size < Decimal::ZERO {
            return Err(CoreError::InvalidConfig(format!(
                "tick_size must be non-negative, got {}",
                self.tick_size
            )));
        }
        Ok(())
    }
}
