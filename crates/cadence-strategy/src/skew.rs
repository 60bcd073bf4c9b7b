//! Inventory skew: converts open inventory into a bounded price bias.

use cadence_core::{Position, Size};

use crate::config::StrategyConfig;

/// Signed net position: long positive, short negative. Exact decimal
/// arithmetic; the result only becomes `f64` inside the offset formula.
pub fn net_size(positions: &[Position]) -> Size {
    positions
        .iter()
        .fold(Size::ZERO, |acc, p| acc + p.signed_size())
}

/// Outcome of the skew calculation for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventorySkew {
    /// Price offset applied to both legs. Long inventory pushes quotes
    /// down (toward selling); short pushes them up.
    pub offset: f64,
    /// Dead-band signal: |net| is inside the configured noise band, so
    /// the coordinator should cancel resting orders instead of
    /// re-quoting on inventory noise.
    pub flatten: bool,
}

/// Compute the skew offset for the current net position.
///
/// `offset = −risk · d · net / lot_size / max_inventory_multiple`
///
/// `max_inventory_multiple` caps how aggressively large imbalances are
/// chased; `d` scales the bias to current volatility.
pub fn inventory_skew(d: f64, net: Size, config: &StrategyConfig) -> InventorySkew {
    let lot = config.lot_size.as_f64();
    let offset = -config.risk_rate * d * net.as_f64() / lot / config.max_inventory_multiple;

    let dead_band = config.inventory_dead_band_lots * lot;
    let flatten = dead_band > 0.0 && net.abs().as_f64() < dead_band;

    InventorySkew { offset, flatten }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::PositionSide;
    use rust_decimal_macros::dec;

    fn long(size: rust_decimal::Decimal) -> Position {
        Position::new(PositionSide::Long, Size::new(size))
    }

    fn short(size: rust_decimal::Decimal) -> Position {
        Position::new(PositionSide::Short, Size::new(size))
    }

    fn config() -> StrategyConfig {
        StrategyConfig {
            risk_rate: 1.0,
            lot_size: dec!(0.01),
            max_inventory_multiple: 4.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_net_size_signed_sum() {
        let net = net_size(&[long(dec!(1.0)), short(dec!(0.4))]);
        assert_eq!(net, Size::new(dec!(0.6)));
    }

    #[test]
    fn test_net_size_empty_is_flat() {
        assert_eq!(net_size(&[]), Size::ZERO);
    }

    #[test]
    fn test_net_size_short_heavy() {
        let net = net_size(&[long(dec!(0.2)), short(dec!(0.5)), short(dec!(0.1))]);
        assert_eq!(net, Size::new(dec!(-0.4)));
    }

    #[test]
    fn test_flat_position_no_offset() {
        let skew = inventory_skew(0.5, Size::ZERO, &config());
        assert_eq!(skew.offset, 0.0);
        assert!(!skew.flatten);
    }

    #[test]
    fn test_long_inventory_biases_downward() {
        // net = 2 lots long: offset = -1 * 0.5 * 0.02 / 0.01 / 4 = -0.25
        let skew = inventory_skew(0.5, Size::new(dec!(0.02)), &config());
        assert!((skew.offset + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_short_inventory_biases_upward() {
        let skew = inventory_skew(0.5, Size::new(dec!(-0.02)), &config());
        assert!((skew.offset - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_offset_monotone_in_inventory() {
        let cfg = config();
        let mut last = f64::INFINITY;
        for lots in [-3i64, -1, 0, 1, 3] {
            let net = Size::new(rust_decimal::Decimal::new(lots, 2)); // lots/100
            let offset = inventory_skew(0.5, net, &cfg).offset;
            assert!(offset < last, "offset must fall as inventory grows");
            last = offset;
        }
    }

    #[test]
    fn test_dead_band_disabled_by_default() {
        let skew = inventory_skew(0.5, Size::new(dec!(0.001)), &config());
        assert!(!skew.flatten);
    }

    #[test]
    fn test_dead_band_flags_noise_inventory() {
        let cfg = StrategyConfig {
            inventory_dead_band_lots: 1.0,
            ..config()
        };
        // half a lot: inside the band
        let skew = inventory_skew(0.5, Size::new(dec!(0.005)), &cfg);
        assert!(skew.flatten);

        // exactly one lot: outside (band is exclusive)
        let skew = inventory_skew(0.5, Size::new(dec!(0.01)), &cfg);
        assert!(!skew.flatten);
    }
}
