//! Hand-rolled mock clients for unit and integration tests.
//!
//! Kept in the library (not `#[cfg(test)]`) so downstream crates can
//! drive the full cycle/scheduler machinery against scripted failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use cadence_core::{
    Board, Execution, Order, OrderId, OrderSide, OrderStatus, OrderType, Position, Price, Size,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::client::{AccountClient, BoxFuture, MarketDataClient};
use crate::error::{ExchangeError, ExchangeResult};

/// How the mock subscription task should behave.
#[derive(Debug, Clone)]
pub enum SubscribeBehavior {
    /// Block until the scope is cancelled, then return `Ok(())`.
    BlockUntilCancelled,
    /// Fail with a connection error after the given delay.
    FailAfter(Duration),
}

/// Mock market-data client with scripted subscription behavior.
pub struct MockMarketData {
    executions: Mutex<Vec<Execution>>,
    board: Mutex<Option<Board>>,
    behavior: Mutex<SubscribeBehavior>,
    subscribe_count: AtomicU64,
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            executions: Mutex::new(Vec::new()),
            board: Mutex::new(None),
            behavior: Mutex::new(SubscribeBehavior::BlockUntilCancelled),
            subscribe_count: AtomicU64::new(0),
        }
    }

    pub fn set_executions(&self, executions: Vec<Execution>) {
        *self.executions.lock() = executions;
    }

    pub fn set_board(&self, board: Board) {
        *self.board.lock() = Some(board);
    }

    pub fn set_subscribe_behavior(&self, behavior: SubscribeBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Number of times `subscribe` was entered (restart counting).
    pub fn subscribe_count(&self) -> u64 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

impl MarketDataClient for MockMarketData {
    fn subscribe(&self, shutdown: CancellationToken) -> BoxFuture<'_, ExchangeResult<()>> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        Box::pin(async move {
            match behavior {
                SubscribeBehavior::BlockUntilCancelled => {
                    shutdown.cancelled().await;
                    Ok(())
                }
                SubscribeBehavior::FailAfter(delay) => {
                    tokio::select! {
                        _ = shutdown.cancelled() => Ok(()),
                        _ = tokio::time::sleep(delay) => {
                            Err(ExchangeError::Connection("mock stream dropped".to_string()))
                        }
                    }
                }
            }
        })
    }

    fn recent_executions(&self, _window: Duration) -> Vec<Execution> {
        // scripted prints are the window; tests control them directly
        self.executions.lock().clone()
    }

    fn current_board(&self) -> Option<Board> {
        self.board.lock().clone()
    }
}

/// Mock account client: records every call, supports scripted failures.
pub struct MockAccountClient {
    positions: Mutex<Vec<Position>>,
    orders: Mutex<HashMap<String, Order>>,
    next_id: AtomicU64,
    /// Sides whose placement should be rejected.
    fail_sides: Mutex<Vec<OrderSide>>,
    /// Sides whose orders fill the moment they rest.
    fill_sides: Mutex<Vec<OrderSide>>,
    /// Artificial latency applied before each placement.
    place_delay: Mutex<Option<Duration>>,
    fail_positions: AtomicBool,
    fail_get_order: AtomicBool,
    fail_cancel_all: AtomicBool,
    cancel_calls: Mutex<Vec<OrderId>>,
    cancel_all_calls: AtomicU64,
    collateral: Mutex<Decimal>,
}

impl Default for MockAccountClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccountClient {
    pub fn new() -> Self {
        Self {
            positions: Mutex::new(Vec::new()),
            orders: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            fail_sides: Mutex::new(Vec::new()),
            fill_sides: Mutex::new(Vec::new()),
            place_delay: Mutex::new(None),
            fail_positions: AtomicBool::new(false),
            fail_get_order: AtomicBool::new(false),
            fail_cancel_all: AtomicBool::new(false),
            cancel_calls: Mutex::new(Vec::new()),
            cancel_all_calls: AtomicU64::new(0),
            collateral: Mutex::new(Decimal::ZERO),
        }
    }

    pub fn set_positions(&self, positions: Vec<Position>) {
        *self.positions.lock() = positions;
    }

    pub fn set_fail_positions(&self, fail: bool) {
        self.fail_positions.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_get_order(&self, fail: bool) {
        self.fail_get_order.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_cancel_all(&self, fail: bool) {
        self.fail_cancel_all.store(fail, Ordering::SeqCst);
    }

    /// Reject placements for `side` with an order-rejected error.
    pub fn fail_side(&self, side: OrderSide) {
        self.fail_sides.lock().push(side);
    }

    /// Fill orders on `side` immediately at placement, as if the quote
    /// traded the moment it rested.
    pub fn fill_side_on_place(&self, side: OrderSide) {
        self.fill_sides.lock().push(side);
    }

    pub fn set_place_delay(&self, delay: Option<Duration>) {
        *self.place_delay.lock() = delay;
    }

    pub fn set_collateral(&self, value: Decimal) {
        *self.collateral.lock() = value;
    }

    /// Mark an order filled, as if the quote traded while resting.
    pub fn fill_order(&self, id: &OrderId) {
        if let Some(order) = self.orders.lock().get_mut(id.as_str()) {
            order.status = OrderStatus::Filled;
        }
    }

    /// Every order ever placed.
    pub fn placed_orders(&self) -> Vec<Order> {
        self.orders.lock().values().cloned().collect()
    }

    pub fn order_status(&self, id: &OrderId) -> Option<OrderStatus> {
        self.orders.lock().get(id.as_str()).map(|o| o.status)
    }

    /// Ids passed to `cancel_order`, including rejected attempts.
    pub fn cancel_calls(&self) -> Vec<OrderId> {
        self.cancel_calls.lock().clone()
    }

    pub fn cancel_all_calls(&self) -> u64 {
        self.cancel_all_calls.load(Ordering::SeqCst)
    }
}

impl AccountClient for MockAccountClient {
    fn open_positions(&self) -> BoxFuture<'_, ExchangeResult<Vec<Position>>> {
        Box::pin(async move {
            if self.fail_positions.load(Ordering::SeqCst) {
                return Err(ExchangeError::Account("mock positions failure".to_string()));
            }
            Ok(self.positions.lock().clone())
        })
    }

    fn place_order(
        &self,
        side: OrderSide,
        price: Price,
        size: Size,
        _order_type: OrderType,
    ) -> BoxFuture<'_, ExchangeResult<OrderId>> {
        Box::pin(async move {
            // rejection is immediate; latency only delays accepted orders
            if self.fail_sides.lock().contains(&side) {
                return Err(ExchangeError::OrderRejected {
                    side,
                    reason: "mock rejection".to_string(),
                });
            }
            let delay = *self.place_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let id = OrderId::new(format!("mock-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
            let status = if self.fill_sides.lock().contains(&side) {
                OrderStatus::Filled
            } else {
                OrderStatus::Active
            };
            self.orders.lock().insert(
                id.as_str().to_string(),
                Order {
                    id: id.clone(),
                    side,
                    price,
                    size,
                    status,
                },
            );
            Ok(id)
        })
    }

    fn cancel_order(&self, id: OrderId) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            self.cancel_calls.lock().push(id.clone());
            let mut orders = self.orders.lock();
            let order = orders
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
            self.cancel_all_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_cancel_all.load(Ordering::SeqCst) {
                return Err(ExchangeError::Account("mock cancel-all failure".to_string()));
            }
            for order in self.orders.lock().values_mut() {
                if !order.status.is_terminal() {
                    order.status = OrderStatus::Canceled;
                }
            }
            Ok(())
        })
    }

    fn get_order(&self, id: OrderId) -> BoxFuture<'_, ExchangeResult<OrderStatus>> {
        Box::pin(async move {
            if self.fail_get_order.load(Ordering::SeqCst) {
                return Err(ExchangeError::Account("mock status failure".to_string()));
            }
            self.orders
                .lock()
                .get(id.as_str())
                .map(|o| o.status)
                .ok_or_else(|| ExchangeError::OrderNotFound(id.as_str().to_string()))
        })
    }

    fn collateral(&self) -> BoxFuture<'_, ExchangeResult<Decimal>> {
        Box::pin(async move { Ok(*self.collateral.lock()) })
    }
}
