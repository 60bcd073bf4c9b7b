//! Degenerate-input outcomes of the quote computation.

use thiserror::Error;

/// A quote computation that must not reach order submission.
///
/// Every variant is detected before any price is built; the coordinator
/// treats these as "skip this cycle", never as a fatal error. NaN or
/// infinity can therefore never be submitted as a price.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Degenerate {
    /// No executions in the trailing window; variance is undefined.
    #[error("empty execution window")]
    EmptyWindow,

    /// Board snapshot missing or mid price not positive.
    #[error("board has no usable mid price")]
    MissingMid,

    /// No traded volume within the volatility band around mid.
    #[error("no traded liquidity within {band} of mid {mid}")]
    ZeroTradedLiquidity { mid: f64, band: f64 },

    /// No resting volume within the volatility band around mid.
    #[error("no resting liquidity within {band} of mid {mid}")]
    ZeroRestingLiquidity { mid: f64, band: f64 },

    /// A spread, offset, or price came out non-finite.
    #[error("non-finite quote value ({context})")]
    NonFinite { context: &'static str },
}
