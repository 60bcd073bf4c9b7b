//! Application wiring.
//!
//! Builds the paper exchange, the quote calculator, the cycle
//! coordinator, and the supervisor from one immutable `AppConfig`, then
//! runs the supervisor until shutdown.

use std::sync::Arc;

use cadence_engine::{CycleConfig, CycleCoordinator, Supervisor, SupervisorConfig};
use cadence_exchange::{DynAccountClient, DynMarketDataClient, PaperExchange};
use cadence_strategy::QuoteCalculator;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppResult;

/// The assembled bot.
pub struct Application {
    supervisor: Supervisor,
}

impl Application {
    /// Wire all components from configuration.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        info!(
            interval_ms = config.interval_ms,
            dwell_ms = config.dwell().as_millis() as u64,
            risk_rate = config.strategy.risk_rate,
            lot = %config.strategy.lot_size,
            max_inventory_multiple = config.strategy.max_inventory_multiple,
            leg_policy = ?config.leg_policy,
            "configuring bot"
        );

        let exchange = Arc::new(PaperExchange::new(config.paper.clone()));
        let market: DynMarketDataClient = exchange.clone();
        let account: DynAccountClient = exchange;

        let coordinator = CycleCoordinator::new(
            market.clone(),
            account.clone(),
            QuoteCalculator::new(config.strategy.clone()),
            CycleConfig {
                interval: config.interval(),
                dwell: config.dwell(),
                leg_policy: config.leg_policy,
            },
        );

        let supervisor = Supervisor::new(
            market,
            account,
            coordinator,
            SupervisorConfig {
                interval: config.interval(),
                telemetry_interval: config.telemetry_interval(),
            },
        );

        Ok(Self { supervisor })
    }

    /// Run until the shutdown token is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        self.supervisor.run(shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wires_from_default_config() {
        assert!(Application::new(AppConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AppConfig {
            interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(Application::new(config).is_err());
    }
}
