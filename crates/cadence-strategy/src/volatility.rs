//! Trade-price volatility over the trailing execution window.

use cadence_core::Execution;

/// Population variance of trade price: `E[X²] − E[X]²`.
///
/// Returns `None` for an empty window. The N=0 case is a degenerate
/// input (division by zero) and is guarded here rather than silently
/// propagated as NaN.
pub fn variance(executions: &[Execution]) -> Option<f64> {
    if executions.is_empty() {
        return None;
    }
    let n = executions.len() as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for execution in executions {
        let price = execution.price.as_f64();
        sum += price;
        sum_sq += price * price;
    }
    let mean = sum / n;
    Some(sum_sq / n - mean * mean)
}

/// Map variance to the spread-scale statistic `d = variance^p`.
///
/// `p` ≈ 0.5–0.6 dampens extreme volatility sub-linearly. Variance is
/// clamped at zero first: `E[X²] − E[X]²` can come out a hair negative
/// in floating point for a constant window.
pub fn spread_scale(variance: f64, exponent: f64) -> f64 {
    variance.max(0.0).powf(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Price, Size};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn window(prices: &[Decimal]) -> Vec<Execution> {
        prices
            .iter()
            .map(|p| Execution::new(Price::new(*p), Size::new(dec!(0.01)), Utc::now()))
            .collect()
    }

    #[test]
    fn test_empty_window_is_degenerate() {
        assert_eq!(variance(&[]), None);
    }

    #[test]
    fn test_identical_prices_zero_variance() {
        for n in [1, 2, 7] {
            let prices = vec![dec!(123.45); n];
            let v = variance(&window(&prices)).unwrap();
            assert!(v.abs() < 1e-9, "n={n}: variance {v}");
        }
    }

    #[test]
    fn test_variance_known_value() {
        // mean = 150, variance = 2500
        let v = variance(&window(&[dec!(100), dec!(100), dec!(200), dec!(200)])).unwrap();
        assert!((v - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn test_variance_order_independent() {
        let a = variance(&window(&[dec!(100), dec!(100), dec!(200), dec!(200)])).unwrap();
        let b = variance(&window(&[dec!(200), dec!(100), dec!(200), dec!(100)])).unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_reference_window() {
        // [99, 100, 101, 100, 100]: mean 100, variance 0.4
        let v = variance(&window(&[
            dec!(99),
            dec!(100),
            dec!(101),
            dec!(100),
            dec!(100),
        ]))
        .unwrap();
        assert!((v - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_spread_scale_dampens_sublinearly() {
        let d = spread_scale(0.4, 0.55);
        // 0.4^0.55 ≈ 0.604
        assert!((d - 0.4f64.powf(0.55)).abs() < 1e-12);
        assert!(d > 0.4 && d < 1.0);

        // large variance gets compressed
        assert!(spread_scale(10_000.0, 0.55) < 10_000.0);
    }

    #[test]
    fn test_spread_scale_clamps_negative_noise() {
        assert_eq!(spread_scale(-1e-12, 0.55), 0.0);
    }
}
