//! The unified quote calculator.
//!
//! One tested computational core replaces the historical spread/offset
//! variants; the knobs that differed between them (volatility exponent,
//! microstructure term, inventory dead-band) are configuration.
//!
//! ```text
//! d      = variance(window)^p
//! spread = risk·d  [+ 2/traded · ln(1 + risk/resting)]
//! offset = −risk·d·net / lot / max_inventory_multiple
//! ask    = floor(mid + offset + spread/2)   (to tick)
//! bid    = floor(mid + offset − spread/2)   (to tick)
//! ```

use cadence_core::{Board, Execution, Position, Price, Quote, Size};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::StrategyConfig;
use crate::error::Degenerate;
use crate::liquidity::{microstructure_term, resting_amount, traded_amount};
use crate::skew::{inventory_skew, net_size};
use crate::volatility::{spread_scale, variance};

/// Everything the calculator reads for one cycle.
#[derive(Debug)]
pub struct QuoteInputs<'a> {
    pub executions: &'a [Execution],
    pub board: &'a Board,
    pub positions: &'a [Position],
}

/// Numeric context of a computed quote, carried for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteStats {
    pub variance: f64,
    pub spread_scale: f64,
    pub spread: f64,
    pub offset: f64,
    pub mid: f64,
    pub net_size: Decimal,
}

/// A quote the coordinator may submit, plus the flatten signal.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDecision {
    pub quote: Quote,
    /// Inventory inside the dead-band: cancel resting orders instead of
    /// re-quoting.
    pub flatten: bool,
    pub stats: QuoteStats,
}

/// Stateless quote computation over one immutable configuration.
#[derive(Debug, Clone)]
pub struct QuoteCalculator {
    config: StrategyConfig,
}

impl QuoteCalculator {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Compute the cycle's quote.
    ///
    /// Every degenerate input (empty window, missing mid, zero
    /// liquidity, non-finite arithmetic) is returned as `Degenerate`
    /// before any price exists, so submission can never see NaN/Inf.
    pub fn compute(&self, inputs: &QuoteInputs<'_>) -> Result<QuoteDecision, Degenerate> {
        let cfg = &self.config;

        if !inputs.board.has_mid() {
            return Err(Degenerate::MissingMid);
        }
        let mid = inputs.board.mid.as_f64();

        let variance = variance(inputs.executions).ok_or(Degenerate::EmptyWindow)?;
        let d = spread_scale(variance, cfg.volatility_exponent);

        let mut spread = cfg.risk_rate * d;
        if cfg.microstructure_enabled {
            let traded = traded_amount(inputs.executions, mid, d);
            let resting = resting_amount(&inputs.board.bids, &inputs.board.asks, mid, d);
            spread += microstructure_term(traded, resting, cfg.risk_rate, mid, d)?;
        }

        let net = net_size(inputs.positions);
        let skew = inventory_skew(d, net, cfg);

        if !spread.is_finite() || spread < 0.0 {
            return Err(Degenerate::NonFinite { context: "spread" });
        }
        if !skew.offset.is_finite() {
            return Err(Degenerate::NonFinite { context: "offset" });
        }

        let center = mid + skew.offset;
        let ask = Price::from_f64_floored(center + spread / 2.0, Price::new(cfg.tick_size))
            .ok_or(Degenerate::NonFinite { context: "ask" })?;
        let bid = Price::from_f64_floored(center - spread / 2.0, Price::new(cfg.tick_size))
            .ok_or(Degenerate::NonFinite { context: "bid" })?;

        let decision = QuoteDecision {
            quote: Quote::new(bid, ask, Size::new(cfg.lot_size)),
            flatten: skew.flatten,
            stats: QuoteStats {
                variance,
                spread_scale: d,
                spread,
                offset: skew.offset,
                mid,
                net_size: net.inner(),
            },
        };
        debug!(
            variance,
            d,
            spread,
            offset = skew.offset,
            mid,
            net = %net,
            bid = %decision.quote.bid_price,
            ask = %decision.quote.ask_price,
            "quote computed"
        );
        Ok(decision)
    }
}
