//! End-to-end: the supervisor loop against the deterministic paper
//! exchange, at test speed.

use std::sync::Arc;
use std::time::Duration;

use cadence_engine::{CycleConfig, CycleCoordinator, LegPolicy, Supervisor, SupervisorConfig};
use cadence_exchange::{DynAccountClient, DynMarketDataClient, PaperConfig, PaperExchange};
use cadence_strategy::{QuoteCalculator, StrategyConfig};
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

fn fast_paper() -> Arc<PaperExchange> {
    Arc::new(PaperExchange::new(PaperConfig {
        start_mid: dec!(10000),
        step_interval_ms: 5,
        seed: 7,
        ..Default::default()
    }))
}

fn build_supervisor(exchange: Arc<PaperExchange>) -> Supervisor {
    let market: DynMarketDataClient = exchange.clone();
    let account: DynAccountClient = exchange;

    let strategy = StrategyConfig {
        lot_size: dec!(0.01),
        tick_size: dec!(1),
        ..Default::default()
    };
    let coordinator = CycleCoordinator::new(
        market.clone(),
        account.clone(),
        QuoteCalculator::new(strategy),
        CycleConfig {
            interval: Duration::from_millis(50),
            dwell: Duration::from_millis(20),
            leg_policy: LegPolicy::RunToCompletion,
        },
    );
    Supervisor::new(
        market,
        account,
        coordinator,
        SupervisorConfig {
            interval: Duration::from_millis(50),
            telemetry_interval: Duration::from_millis(40),
        },
    )
}

#[tokio::test]
async fn paper_session_quotes_and_resolves_every_order() {
    let exchange = fast_paper();
    let supervisor = build_supervisor(exchange.clone());

    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        stopper.cancel();
    });
    supervisor.run(shutdown).await;

    let orders = exchange.orders();
    assert!(
        orders.len() >= 2,
        "expected at least one quote pair, got {}",
        orders.len()
    );

    // every submitted leg reached a terminal state: filled while
    // resting, or canceled at reconciliation/shutdown
    for order in &orders {
        assert!(
            order.status.is_terminal(),
            "order {} left {:?}",
            order.id,
            order.status
        );
        assert_eq!(order.size, cadence_core::Size::new(dec!(0.01)));
    }
}

#[tokio::test]
async fn paper_session_never_rests_more_than_one_order_per_side() {
    let exchange = fast_paper();
    let supervisor = build_supervisor(exchange.clone());

    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();

    // sample the open-order counts while the loop runs
    let sampler_exchange = exchange.clone();
    let sampler = tokio::spawn(async move {
        let mut max_buys = 0usize;
        let mut max_sells = 0usize;
        for _ in 0..80 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let orders = sampler_exchange.orders();
            let buys = orders
                .iter()
                .filter(|o| o.side == cadence_core::OrderSide::Buy && !o.status.is_terminal())
                .count();
            let sells = orders
                .iter()
                .filter(|o| o.side == cadence_core::OrderSide::Sell && !o.status.is_terminal())
                .count();
            max_buys = max_buys.max(buys);
            max_sells = max_sells.max(sells);
        }
        stopper.cancel();
        (max_buys, max_sells)
    });

    supervisor.run(shutdown).await;
    let (max_buys, max_sells) = sampler.await.unwrap();

    assert!(max_buys <= 1, "saw {max_buys} resting buys");
    assert!(max_sells <= 1, "saw {max_sells} resting sells");
}
