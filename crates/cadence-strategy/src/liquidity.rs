//! Local liquidity around the mid price.
//!
//! Both measures look at the open band `(mid − d, mid + d)` where `d`
//! is the current spread scale: liquidity further away than one
//! volatility unit does not protect a resting quote.

use cadence_core::{BookLevel, Execution};

use crate::error::Degenerate;

/// Sum of traded sizes with price inside `(mid − d, mid + d)`.
pub fn traded_amount(executions: &[Execution], mid: f64, d: f64) -> f64 {
    executions
        .iter()
        .filter(|e| {
            let price = e.price.as_f64();
            price > mid - d && price < mid + d
        })
        .map(|e| e.size.as_f64())
        .sum()
}

/// Sum of resting sizes on both sides inside `(mid − d, mid + d)`.
pub fn resting_amount(bids: &[BookLevel], asks: &[BookLevel], mid: f64, d: f64) -> f64 {
    bids.iter()
        .chain(asks.iter())
        .filter(|level| {
            let price = level.price.as_f64();
            price > mid - d && price < mid + d
        })
        .map(|level| level.size.as_f64())
        .sum()
}

/// Thin-liquidity spread penalty: `2 / traded · ln(1 + risk / resting)`.
///
/// Both denominators can legitimately be zero on a quiet book; each is
/// an explicit degenerate input, never divided into.
pub fn microstructure_term(
    traded: f64,
    resting: f64,
    risk: f64,
    mid: f64,
    band: f64,
) -> Result<f64, Degenerate> {
    if traded <= 0.0 {
        return Err(Degenerate::ZeroTradedLiquidity { mid, band });
    }
    if resting <= 0.0 {
        return Err(Degenerate::ZeroRestingLiquidity { mid, band });
    }
    Ok(2.0 / traded * (1.0 + risk / resting).ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Price, Size};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn print(price: Decimal, size: Decimal) -> Execution {
        Execution::new(Price::new(price), Size::new(size), Utc::now())
    }

    fn level(price: Decimal, size: Decimal) -> BookLevel {
        BookLevel::new(Price::new(price), Size::new(size))
    }

    #[test]
    fn test_traded_amount_band_is_exclusive() {
        let executions = vec![
            print(dec!(99.5), dec!(1)),  // inside
            print(dec!(100.5), dec!(2)), // inside
            print(dec!(99), dec!(4)),    // on the boundary: excluded
            print(dec!(101), dec!(8)),   // on the boundary: excluded
            print(dec!(98), dec!(16)),   // outside
        ];
        assert_eq!(traded_amount(&executions, 100.0, 1.0), 3.0);
    }

    #[test]
    fn test_resting_amount_sums_both_sides() {
        let bids = vec![level(dec!(99.5), dec!(1)), level(dec!(98), dec!(10))];
        let asks = vec![level(dec!(100.5), dec!(2)), level(dec!(102), dec!(10))];
        assert_eq!(resting_amount(&bids, &asks, 100.0, 1.0), 3.0);
    }

    #[test]
    fn test_microstructure_term_value() {
        // 2/4 * ln(1 + 1/2)
        let term = microstructure_term(4.0, 2.0, 1.0, 100.0, 1.0).unwrap();
        assert!((term - 0.5 * 1.5f64.ln()).abs() < 1e-12);
        assert!(term > 0.0);
    }

    #[test]
    fn test_zero_traded_is_degenerate() {
        let err = microstructure_term(0.0, 2.0, 1.0, 100.0, 1.0).unwrap_err();
        assert!(matches!(err, Degenerate::ZeroTradedLiquidity { .. }));
    }

    #[test]
    fn test_zero_resting_is_degenerate() {
        let err = microstructure_term(4.0, 0.0, 1.0, 100.0, 1.0).unwrap_err();
        assert!(matches!(err, Degenerate::ZeroRestingLiquidity { .. }));
    }

    #[test]
    fn test_thinner_liquidity_wider_term() {
        let thick = microstructure_term(10.0, 10.0, 1.0, 100.0, 1.0).unwrap();
        let thin = microstructure_term(1.0, 1.0, 1.0, 100.0, 1.0).unwrap();
        assert!(thin > thick);
    }
}
