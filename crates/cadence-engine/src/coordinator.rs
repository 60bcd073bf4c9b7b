//! The per-tick order cycle.
//!
//! One cycle walks Idle → Quoting → Submitting → Holding → Reconciling
//! and back to Idle. Any fetch or submit failure takes the ErrorRecovery
//! transition: a best-effort account-wide cancel-all, then the original
//! error propagates to the supervisor. There is no retry inside a
//! cycle; the supervisor's unconditional re-entry is the sole retry
//! mechanism.

use std::sync::Arc;
use std::time::Duration;

use cadence_core::{OrderId, OrderSide, OrderStatus, OrderType, Price, Size};
use cadence_exchange::{DynAccountClient, DynMarketDataClient};
use cadence_strategy::{Degenerate, QuoteCalculator, QuoteInputs, QuoteStats};
use cadence_telemetry::Metrics;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{CycleError, CycleResult};

/// What to do with the sibling when one leg fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegPolicy {
    /// Each leg runs its submit→hold→reconcile to the end regardless of
    /// the sibling; the cycle result is first-error-wins after both
    /// finish.
    #[default]
    RunToCompletion,
    /// The first leg error cancels the sibling subtask immediately;
    /// recovery cancel-all cleans up whatever it had resting.
    FailFast,
}

/// Cycle timing and leg-join behavior.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Cycle period; also the trailing execution window.
    pub interval: Duration,
    /// How long a leg rests before reconciliation. Ordinarily equal to
    /// the interval.
    pub dwell: Duration,
    pub leg_policy: LegPolicy,
}

/// How one leg ended the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegReport {
    pub id: OrderId,
    pub side: OrderSide,
    /// Status observed at reconciliation, before any cancel we issued.
    pub observed: OrderStatus,
}

/// Result of a completed (non-failed) cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Both legs were submitted and resolved to a terminal state.
    Quoted {
        stats: QuoteStats,
        sell: LegReport,
        buy: LegReport,
    },
    /// Degenerate computation: nothing was submitted.
    Skipped(Degenerate),
    /// Inventory dead-band: resting orders canceled instead of quoting.
    Flattened { stats: QuoteStats },
}

impl CycleOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Quoted { .. } => "quoted",
            Self::Skipped(_) => "skipped",
            Self::Flattened { .. } => "flattened",
        }
    }
}

/// Drives one submit→hold→reconcile pair per tick.
pub struct CycleCoordinator {
    market: DynMarketDataClient,
    account: DynAccountClient,
    calculator: QuoteCalculator,
    config: CycleConfig,
    /// Numeric context of the most recent computation, kept so the
    /// supervisor can log it when a session dies.
    last_stats: Mutex<Option<QuoteStats>>,
}

impl CycleCoordinator {
    pub fn new(
        market: DynMarketDataClient,
        account: DynAccountClient,
        calculator: QuoteCalculator,
        config: CycleConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            market,
            account,
            calculator,
            config,
            last_stats: Mutex::new(None),
        })
    }

    /// Stats from the last computed quote, for postmortem logging.
    pub fn last_stats(&self) -> Option<QuoteStats> {
        *self.last_stats.lock()
    }

    /// Run one full cycle.
    ///
    /// `session` is the shared cancellation scope: a shutdown during the
    /// hold interrupts the dwell early but both legs still reconcile.
    pub async fn run_cycle(&self, session: &CancellationToken) -> CycleResult<CycleOutcome> {
        match self.execute(session).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(self.recover(err).await),
        }
    }

    async fn execute(&self, session: &CancellationToken) -> CycleResult<CycleOutcome> {
        // Quoting: pull a fresh snapshot of everything.
        let positions = self
            .account
            .open_positions()
            .await
            .map_err(CycleError::DataFetch)?;
        let executions = self.market.recent_executions(self.config.interval);

        let Some(board) = self.market.current_board() else {
            // no board yet is a data gap, not a fetch failure: skip
            debug!("no board snapshot yet, skipping cycle");
            return Ok(CycleOutcome::Skipped(Degenerate::MissingMid));
        };

        let decision = match self.calculator.compute(&QuoteInputs {
            executions: &executions,
            board: &board,
            positions: &positions,
        }) {
            Ok(decision) => decision,
            Err(degenerate) => {
                warn!(reason = %degenerate, "degenerate quote, skipping cycle");
                return Ok(CycleOutcome::Skipped(degenerate));
            }
        };
        *self.last_stats.lock() = Some(decision.stats);
        Metrics::quote_shape(decision.stats.spread, decision.stats.offset);

        if decision.flatten {
            info!(
                net = %decision.stats.net_size,
                "inventory inside dead-band, canceling resting orders"
            );
            if let Err(err) = self.account.cancel_all_orders().await {
                warn!(error = %err, "flatten cancel-all failed");
            }
            return Ok(CycleOutcome::Flattened {
                stats: decision.stats,
            });
        }

        info!(
            mid = decision.stats.mid,
            spread = decision.stats.spread,
            offset = decision.stats.offset,
            net = %decision.stats.net_size,
            sell = %decision.quote.ask_price,
            buy = %decision.quote.bid_price,
            lot = %decision.quote.size,
            "submitting quote pair"
        );

        // Submitting → Holding → Reconciling, one subtask per leg. Each
        // leg returns its own result value; the join is deterministic,
        // sell reported first.
        let sell = self.run_leg(
            OrderSide::Sell,
            decision.quote.ask_price,
            decision.quote.size,
            session,
        );
        let buy = self.run_leg(
            OrderSide::Buy,
            decision.quote.bid_price,
            decision.quote.size,
            session,
        );

        let (sell, buy) = match self.config.leg_policy {
            LegPolicy::RunToCompletion => {
                let (sell, buy) = tokio::join!(sell, buy);
                (sell?, buy?)
            }
            LegPolicy::FailFast => tokio::try_join!(sell, buy)?,
        };

        Ok(CycleOutcome::Quoted {
            stats: decision.stats,
            sell,
            buy,
        })
    }

    /// One leg: place, hold, reconcile.
    async fn run_leg(
        &self,
        side: OrderSide,
        price: Price,
        size: Size,
        session: &CancellationToken,
    ) -> CycleResult<LegReport> {
        let id = self
            .account
            .place_order(side, price, size, OrderType::Limit)
            .await
            .map_err(CycleError::OrderSubmit)?;
        Metrics::order_submitted(&side.to_string());
        debug!(%id, %side, %price, %size, "order placed");

        // Holding: a cancellable deadline, not a detached sleep. A
        // shutdown mid-hold falls through to reconciliation.
        tokio::select! {
            _ = tokio::time::sleep(self.config.dwell) => {}
            _ = session.cancelled() => {
                debug!(%id, "hold interrupted by shutdown");
            }
        }

        // Reconciling: cancel only what is still working. A terminal
        // order gets no cancel call.
        let observed = self
            .account
            .get_order(id.clone())
            .await
            .map_err(CycleError::DataFetch)?;
        if observed.is_terminal() {
            debug!(%id, status = %observed, "leg already terminal, leaving untouched");
        } else if let Err(err) = self.account.cancel_order(id.clone()).await {
            // best-effort cleanup: logged, never escalated
            warn!(%id, error = %err, "leg cancel failed");
        }

        Ok(LegReport { id, side, observed })
    }

    /// ErrorRecovery: best-effort cancel-all, then the original error.
    async fn recover(&self, err: CycleError) -> CycleError {
        warn!(error = %err, "cycle failed, canceling all orders");
        Metrics::cancel_all();
        if let Err(cancel_err) = self.account.cancel_all_orders().await {
            warn!(error = %cancel_err, "recovery cancel-all failed");
        }
        err
    }
}
