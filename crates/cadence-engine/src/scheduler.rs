//! The restart-on-failure trading loop.
//!
//! A session is three tasks under one child cancellation scope:
//! the market-data subscription (continuous writer), the trading timer
//! (periodic cycles), and the collateral gauge (independent cadence,
//! never fatal). Either of the first two failing tears down the scope
//! and the supervisor immediately rebuilds the session from scratch:
//! resubscribe, fresh timer, no backoff. The supervisor itself only
//! stops when the external shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use cadence_exchange::{DynAccountClient, DynMarketDataClient};
use cadence_telemetry::Metrics;
use rust_decimal::prelude::ToPrimitive;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coordinator::CycleCoordinator;
use crate::error::{EngineError, EngineResult};

/// Supervisor timing.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Trading cycle period.
    pub interval: Duration,
    /// Collateral gauge period.
    pub telemetry_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            telemetry_interval: Duration::from_secs(60),
        }
    }
}

/// Owns the subscribe + trade + telemetry task trio and restarts it
/// forever.
pub struct Supervisor {
    market: DynMarketDataClient,
    account: DynAccountClient,
    coordinator: Arc<CycleCoordinator>,
    config: SupervisorConfig,
}

impl Supervisor {
    pub fn new(
        market: DynMarketDataClient,
        account: DynAccountClient,
        coordinator: Arc<CycleCoordinator>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            market,
            account,
            coordinator,
            config,
        }
    }

    /// Run until `shutdown` is cancelled. Never returns an error: every
    /// session failure is logged and answered with a fresh session.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let session = shutdown.child_token();
            let result = self.run_session(&session).await;
            // stop whatever survived the select before rebuilding
            session.cancel();

            match result {
                Ok(()) => break,
                Err(err) => {
                    // postmortem context: the last quote the cycle saw
                    let stats = self.coordinator.last_stats();
                    warn!(
                        error = %err,
                        spread = stats.map(|s| s.spread),
                        offset = stats.map(|s| s.offset),
                        mid = stats.map(|s| s.mid),
                        net = stats.map(|s| s.net_size.to_f64().unwrap_or(0.0)),
                        "session failed, restarting"
                    );
                    Metrics::restart();
                }
            }
        }
        info!("supervisor stopped");
    }

    /// One subscribe+trade+telemetry session.
    ///
    /// Returns `Ok(())` only when the scope was cancelled from outside;
    /// any task failure surfaces as the session error.
    async fn run_session(&self, session: &CancellationToken) -> EngineResult<()> {
        info!("establishing session");

        let subscription = self.market.subscribe(session.clone());
        let trading = self.trade_loop(session);
        let telemetry = self.telemetry_loop(session);

        tokio::select! {
            result = subscription => {
                result.map_err(EngineError::Subscription)
            }
            result = trading => {
                result.map_err(EngineError::Cycle)
            }
            // the gauge never fails; it only ends on cancellation
            _ = telemetry => Ok(()),
        }
    }

    /// Fixed-interval cycle driver.
    ///
    /// Cycle execution and timer waiting are strictly serial, so a tick
    /// that fires mid-cycle is absorbed, never queued: no two cycles
    /// run concurrently.
    async fn trade_loop(&self, session: &CancellationToken) -> Result<(), crate::CycleError> {
        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = session.cancelled() => return Ok(()),
                _ = ticker.tick() => {}
            }

            let outcome = self.coordinator.run_cycle(session).await?;
            Metrics::cycle(outcome.label());
            debug!(outcome = outcome.label(), "cycle complete");
        }
    }

    /// Collateral gauge writer. Failures are logged, never escalated,
    /// and never block trading.
    async fn telemetry_loop(&self, session: &CancellationToken) {
        let mut ticker = interval_at(
            Instant::now() + self.config.telemetry_interval,
            self.config.telemetry_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = session.cancelled() => return,
                _ = ticker.tick() => {}
            }

            match self.account.collateral().await {
                Ok(value) => {
                    let value = value.to_f64().unwrap_or(0.0);
                    Metrics::collateral(value);
                    debug!(collateral = value, "collateral gauge written");
                }
                Err(err) => {
                    warn!(error = %err, "collateral gauge write failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{CycleConfig, LegPolicy};
    use cadence_core::{Board, BookLevel, Execution, Price, Size};
    use cadence_exchange::mock::{MockAccountClient, MockMarketData, SubscribeBehavior};
    use cadence_strategy::{QuoteCalculator, StrategyConfig};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn market_with_data() -> Arc<MockMarketData> {
        let market = Arc::new(MockMarketData::new());
        market.set_executions(vec![
            Execution::new(Price::new(dec!(99)), Size::new(dec!(0.05)), Utc::now()),
            Execution::new(Price::new(dec!(101)), Size::new(dec!(0.05)), Utc::now()),
        ]);
        market.set_board(Board::new(
            Price::new(dec!(100)),
            vec![BookLevel::new(Price::new(dec!(99.5)), Size::new(dec!(1)))],
            vec![BookLevel::new(Price::new(dec!(100.5)), Size::new(dec!(1)))],
        ));
        market
    }

    fn supervisor(
        market: Arc<MockMarketData>,
        account: Arc<MockAccountClient>,
        interval: Duration,
    ) -> Supervisor {
        let coordinator = CycleCoordinator::new(
            market.clone(),
            account.clone(),
            QuoteCalculator::new(StrategyConfig::default()),
            CycleConfig {
                interval,
                dwell: Duration::from_millis(5),
                leg_policy: LegPolicy::RunToCompletion,
            },
        );
        Supervisor::new(
            market,
            account,
            coordinator,
            SupervisorConfig {
                interval,
                telemetry_interval: Duration::from_secs(3600),
            },
        )
    }

    #[tokio::test]
    async fn test_shutdown_stops_supervisor() {
        let market = market_with_data();
        let account = Arc::new(MockAccountClient::new());
        let supervisor = supervisor(market, account, Duration::from_millis(10));

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });

        // returns instead of restarting forever
        supervisor.run(shutdown).await;
    }

    #[tokio::test]
    async fn test_subscription_failure_restarts_session() {
        let market = market_with_data();
        market.set_subscribe_behavior(SubscribeBehavior::FailAfter(Duration::from_millis(10)));
        let account = Arc::new(MockAccountClient::new());
        let supervisor = supervisor(market.clone(), account, Duration::from_secs(3600));

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stopper.cancel();
        });
        supervisor.run(shutdown).await;

        // the subscription was re-established after each drop
        assert!(market.subscribe_count() >= 2, "expected resubscribes");
    }

    #[tokio::test]
    async fn test_cycle_failure_tears_down_and_resubscribes() {
        let market = market_with_data();
        let account = Arc::new(MockAccountClient::new());
        account.set_fail_positions(true);
        let supervisor = supervisor(market.clone(), account.clone(), Duration::from_millis(10));

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            stopper.cancel();
        });
        supervisor.run(shutdown).await;

        // every failed cycle killed its session: subscription restarted
        assert!(market.subscribe_count() >= 2, "expected resubscribes");
        // and each failure ran recovery cancel-all
        assert!(account.cancel_all_calls() >= 1);
    }

    #[tokio::test]
    async fn test_cycles_run_on_the_timer() {
        let market = market_with_data();
        let account = Arc::new(MockAccountClient::new());
        let supervisor = supervisor(market, account.clone(), Duration::from_millis(10));

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            stopper.cancel();
        });
        supervisor.run(shutdown).await;

        // several cycles completed; each submitted a sell and a buy
        let orders = account.placed_orders();
        assert!(orders.len() >= 4, "expected repeated quote pairs");
        assert_eq!(orders.len() % 2, 0);
    }
}
