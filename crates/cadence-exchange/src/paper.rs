//! Deterministic paper exchange.
//!
//! Live connectivity and request signing are collaborator concerns, so
//! the default wiring runs against this in-process simulation: a seeded
//! random-walk mid price, a synthetic board, and resting-order fills
//! whenever the walk crosses a quoted price. Fills, positions, and
//! collateral follow plain cash accounting. Good enough to exercise the
//! full quote/submit/hold/reconcile loop; not a backtester.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cadence_core::{
    Board, BookLevel, Execution, Order, OrderId, OrderSide, OrderStatus, OrderType, Position,
    PositionSide, Price, Size,
};
use cadence_feed::MarketWindow;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::{AccountClient, BoxFuture, MarketDataClient};
use crate::error::{ExchangeError, ExchangeResult};

/// Paper exchange parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Starting mid price.
    #[serde(default = "default_start_mid")]
    pub start_mid: Decimal,
    /// Price granularity of the synthetic book.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    /// Cadence of the synthetic price process in milliseconds.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// Maximum mid move per step, in ticks.
    #[serde(default = "default_max_step_ticks")]
    pub max_step_ticks: u32,
    /// Synthetic levels per book side.
    #[serde(default = "default_book_depth")]
    pub book_depth: u32,
    /// Resting size per synthetic level (also the print size).
    #[serde(default = "default_level_size")]
    pub level_size: Decimal,
    /// Starting collateral.
    #[serde(default = "default_initial_collateral")]
    pub initial_collateral: Decimal,
    /// RNG seed; identical seeds replay identical walks.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Execution retention in the shared window, seconds.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

fn default_start_mid() -> Decimal {
    dec!(10000)
}

fn default_tick_size() -> Decimal {
    Decimal::ONE
}

fn default_step_interval_ms() -> u64 {
    250
}

fn default_max_step_ticks() -> u32 {
    3
}

fn default_book_depth() -> u32 {
    5
}

fn default_level_size() -> Decimal {
    dec!(0.1)
}

fn default_initial_collateral() -> Decimal {
    dec!(100000)
}

fn default_seed() -> u64 {
    0x5DEECE66D
}

fn default_retention_secs() -> u64 {
    300
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            start_mid: default_start_mid(),
            tick_size: default_tick_size(),
            step_interval_ms: default_step_interval_ms(),
            max_step_ticks: default_max_step_ticks(),
            book_depth: default_book_depth(),
            level_size: default_level_size(),
            initial_collateral: default_initial_collateral(),
            seed: default_seed(),
            retention_secs: default_retention_secs(),
        }
    }
}

#[derive(Debug)]
struct PaperState {
    mid: Decimal,
    /// Signed net position, long positive.
    net: Decimal,
    /// Cash delta from fills (excludes initial collateral).
    cash: Decimal,
    orders: HashMap<String, Order>,
    rng: u64,
}

/// In-process exchange simulation implementing both client contracts.
pub struct PaperExchange {
    config: PaperConfig,
    window: Arc<MarketWindow>,
    state: Mutex<PaperState>,
}

impl PaperExchange {
    pub fn new(config: PaperConfig) -> Self {
        let retention = chrono::Duration::seconds(config.retention_secs as i64);
        let seed = if config.seed == 0 {
            default_seed()
        } else {
            config.seed
        };
        let state = PaperState {
            mid: config.start_mid,
            net: Decimal::ZERO,
            cash: Decimal::ZERO,
            orders: HashMap::new(),
            rng: seed,
        };
        Self {
            config,
            window: Arc::new(MarketWindow::new(retention)),
            state: Mutex::new(state),
        }
    }

    /// The shared window this exchange writes into.
    pub fn window(&self) -> Arc<MarketWindow> {
        Arc::clone(&self.window)
    }

    /// Snapshot of every order the exchange has seen.
    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().orders.values().cloned().collect()
    }

    /// Advance the synthetic market by one step: move the mid, print a
    /// trade, refresh the board, fill crossed resting orders.
    ///
    /// Called by `subscribe` on its timer; exposed so tests can drive
    /// the market synchronously.
    pub fn advance(&self) {
        let (board, execution) = {
            let mut state = self.state.lock();

            let roll = xorshift64(&mut state.rng);
            let span = (2 * self.config.max_step_ticks + 1) as u64;
            let step_ticks = (roll % span) as i64 - self.config.max_step_ticks as i64;
            let step = Decimal::from(step_ticks) * self.config.tick_size;

            let mut mid = state.mid + step;
            // never let the walk cross zero
            if mid < self.config.tick_size {
                mid = self.config.tick_size;
            }
            state.mid = mid;

            Self::fill_crossed(&mut state, mid);

            let execution = Execution::new(
                Price::new(mid),
                Size::new(self.config.level_size),
                chrono::Utc::now(),
            );
            (self.synthetic_board(mid), execution)
        };

        self.window.push_execution(execution);
        self.window.set_board(board);
    }

    fn synthetic_board(&self, mid: Decimal) -> Board {
        let mut bids = Vec::with_capacity(self.config.book_depth as usize);
        let mut asks = Vec::with_capacity(self.config.book_depth as usize);
        for level in 1..=self.config.book_depth {
            let distance = self.config.tick_size * Decimal::from(level);
            bids.push(BookLevel::new(
                Price::new(mid - distance),
                Size::new(self.config.level_size),
            ));
            asks.push(BookLevel::new(
                Price::new(mid + distance),
                Size::new(self.config.level_size),
            ));
        }
        Board::new(Price::new(mid), bids, asks)
    }

    /// Fill every resting order the new mid has crossed.
    fn fill_crossed(state: &mut PaperState, mid: Decimal) {
        let mut fills: Vec<(Decimal, Decimal)> = Vec::new();
        for order in state.orders.values_mut() {
            if order.status != OrderStatus::Active {
                continue;
            }
            let crossed = match order.side {
                OrderSide::Buy => mid <= order.price.inner(),
                OrderSide::Sell => mid >= order.price.inner(),
            };
            if crossed {
                order.status = OrderStatus::Filled;
                let signed = match order.side {
                    OrderSide::Buy => order.size.inner(),
                    OrderSide::Sell => -order.size.inner(),
                };
                fills.push((signed, order.price.inner()));
                debug!(id = %order.id, side = %order.side, price = %order.price, "paper fill");
            }
        }
        for (signed, price) in fills {
            state.net += signed;
            state.cash -= signed * price;
        }
    }

    fn fill_market(state: &mut PaperState, order: &mut Order) {
        order.status = OrderStatus::Filled;
        let signed = match order.side {
            OrderSide::Buy => order.size.inner(),
            OrderSide::Sell => -order.size.inner(),
        };
        state.net += signed;
        state.cash -= signed * state.mid;
    }
}

/// Minimal deterministic PRNG for the synthetic walk.
fn xorshift64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

impl MarketDataClient for PaperExchange {
    fn subscribe(&self, shutdown: CancellationToken) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            info!(
                start_mid = %self.config.start_mid,
                step_interval_ms = self.config.step_interval_ms,
                "paper market-data subscription started"
            );
            let interval = Duration::from_millis(self.config.step_interval_ms.max(1));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(interval) => self.advance(),
                }
            }
        })
    }

    fn recent_executions(&self, window: Duration) -> Vec<Execution> {
        let window = chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::zero());
        self.window.recent_executions(window)
    }

    fn current_board(&self) -> Option<Board> {
        self.window.board()
    }
}

impl AccountClient for PaperExchange {
    fn open_positions(&self) -> BoxFuture<'_, ExchangeResult<Vec<Position>>> {
        Box::pin(async move {
            let state = self.state.lock();
            if state.net.is_zero() {
                return Ok(Vec::new());
            }
            let side = if state.net.is_sign_positive() {
                PositionSide::Long
            } else {
                PositionSide::Short
            };
            Ok(vec![Position::new(side, Size::new(state.net.abs()))])
        })
    }

    fn place_order(
        &self,
        side: OrderSide,
        price: Price,
        size: Size,
        order_type: OrderType,
    ) -> BoxFuture<'_, ExchangeResult<OrderId>> {
        Box::pin(async move {
            if !price.is_positive() {
                return Err(ExchangeError::OrderRejected {
                    side,
                    reason: format!("non-positive price {price}"),
                });
            }
            if !size.is_positive() {
                return Err(ExchangeError::OrderRejected {
                    side,
                    reason: format!("non-positive size {size}"),
                });
            }

            let id = OrderId::new(format!("paper_{}", &Uuid::new_v4().to_string()[..8]));
            let mut state = self.state.lock();
            let mut order = Order {
                id: id.clone(),
                side,
                price,
                size,
                status: OrderStatus::Active,
            };
            if order_type == OrderType::Market {
                Self::fill_market(&mut state, &mut order);
            }
            state.orders.insert(id.as_str().to_string(), order);
            Ok(id)
        })
    }

    fn cancel_order(&self, id: OrderId) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            let order = state
                .orders
                .get_mut(id.as_str())
                .ok_or_else(|| ExchangeError::OrderNotFound(id.as_str().to_string()))?;
            if order.status.is_terminal() {
                return Err(ExchangeError::CancelRejected {
                    id: id.as_str().to_string(),
                    reason: format!("order already {}", order.status),
                });
            }
            order.status = OrderStatus::Canceled;
            Ok(())
        })
    }

    fn cancel_all_orders(&self) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            for order in state.orders.values_mut() {
                if !order.status.is_terminal() {
                    order.status = OrderStatus::Canceled;
                }
            }
            Ok(())
        })
    }

    fn get_order(&self, id: OrderId) -> BoxFuture<'_, ExchangeResult<OrderStatus>> {
        Box::pin(async move {
            self.state
                .lock()
                .orders
                .get(id.as_str())
                .map(|o| o.status)
                .ok_or_else(|| ExchangeError::OrderNotFound(id.as_str().to_string()))
        })
    }

    fn collateral(&self) -> BoxFuture<'_, ExchangeResult<Decimal>> {
        Box::pin(async move {
            let state = self.state.lock();
            Ok(self.config.initial_collateral + state.cash + state.net * state.mid)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> PaperExchange {
        PaperExchange::new(PaperConfig {
            start_mid: dec!(100),
            tick_size: Decimal::ONE,
            max_step_ticks: 2,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_advance_publishes_board_and_prints() {
        let exchange = paper();
        assert!(exchange.current_board().is_none());

        exchange.advance();
        let board = exchange.current_board().unwrap();
        assert!(board.has_mid());
        assert_eq!(board.bids.len(), 5);
        assert_eq!(board.asks.len(), 5);
        assert_eq!(
            exchange.recent_executions(Duration::from_secs(60)).len(),
            1
        );
    }

    #[tokio::test]
    async fn test_identical_seeds_replay_identical_walks() {
        let a = paper();
        let b = paper();
        for _ in 0..10 {
            a.advance();
            b.advance();
        }
        assert_eq!(
            a.current_board().unwrap().mid,
            b.current_board().unwrap().mid
        );
    }

    #[tokio::test]
    async fn test_crossed_buy_fills_and_creates_long() {
        let exchange = paper();
        // bid far above the walk: must fill on the next step
        let id = exchange
            .place_order(
                OrderSide::Buy,
                Price::new(dec!(100000)),
                Size::new(dec!(0.5)),
                OrderType::Limit,
            )
            .await
            .unwrap();
        exchange.advance();

        assert_eq!(
            exchange.get_order(id).await.unwrap(),
            OrderStatus::Filled
        );
        let positions = exchange.open_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].side, PositionSide::Long);
        assert_eq!(positions[0].size, Size::new(dec!(0.5)));
    }

    #[tokio::test]
    async fn test_far_orders_rest_until_canceled() {
        let exchange = paper();
        let id = exchange
            .place_order(
                OrderSide::Buy,
                Price::new(dec!(1)),
                Size::new(dec!(0.5)),
                OrderType::Limit,
            )
            .await
            .unwrap();
        exchange.advance();
        assert_eq!(
            exchange.get_order(id.clone()).await.unwrap(),
            OrderStatus::Active
        );

        exchange.cancel_order(id.clone()).await.unwrap();
        assert_eq!(
            exchange.get_order(id).await.unwrap(),
            OrderStatus::Canceled
        );
    }

    #[tokio::test]
    async fn test_cancel_filled_order_rejected() {
        let exchange = paper();
        let id = exchange
            .place_order(
                OrderSide::Sell,
                Price::new(dec!(1)),
                Size::new(dec!(0.5)),
                OrderType::Limit,
            )
            .await
            .unwrap();
        exchange.advance(); // sell at 1 crosses immediately

        let err = exchange.cancel_order(id).await.unwrap_err();
        assert!(matches!(err, ExchangeError::CancelRejected { .. }));
    }

    #[tokio::test]
    async fn test_market_order_fills_immediately() {
        let exchange = paper();
        let id = exchange
            .place_order(
                OrderSide::Buy,
                Price::new(dec!(100)),
                Size::new(dec!(1)),
                OrderType::Market,
            )
            .await
            .unwrap();
        assert_eq!(
            exchange.get_order(id).await.unwrap(),
            OrderStatus::Filled
        );
    }

    #[tokio::test]
    async fn test_collateral_tracks_flat_account() {
        let exchange = paper();
        let initial = exchange.collateral().await.unwrap();
        assert_eq!(initial, default_initial_collateral());
    }

    #[tokio::test]
    async fn test_rejects_degenerate_orders() {
        let exchange = paper();
        let err = exchange
            .place_order(
                OrderSide::Buy,
                Price::ZERO,
                Size::new(dec!(1)),
                OrderType::Limit,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::OrderRejected { .. }));
    }
}
