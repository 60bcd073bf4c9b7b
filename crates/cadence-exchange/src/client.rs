//! Exchange client contracts.
//!
//! The quoting core never talks to a wire protocol directly; it consumes
//! these two traits. Trait methods return boxed futures so the traits
//! stay dyn-compatible and implementations can be injected for testing.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use cadence_core::{Board, Execution, OrderId, OrderSide, OrderStatus, OrderType, Position, Price, Size};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::error::ExchangeResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Market-data side of the exchange.
///
/// `subscribe` is the long-lived writer task: it blocks until the stream
/// ends (an error) or the scope is cancelled (clean return). The two
/// accessors are cheap snapshot reads of in-memory state maintained by
/// the subscription; they are restartable per call and never block.
pub trait MarketDataClient: Send + Sync {
    /// Run the market-data subscription until cancelled or disconnected.
    ///
    /// Returns `Ok(())` only on cooperative cancellation;
    /// `ExchangeError::Connection` when the stream drops.
    fn subscribe(&self, shutdown: CancellationToken) -> BoxFuture<'_, ExchangeResult<()>>;

    /// Trade prints within the trailing `window`, most-recent-last.
    fn recent_executions(&self, window: Duration) -> Vec<Execution>;

    /// Latest board snapshot, `None` until first data arrives.
    fn current_board(&self) -> Option<Board>;
}

/// Account/order side of the exchange.
pub trait AccountClient: Send + Sync {
    /// Open positions, polled fresh each cycle.
    fn open_positions(&self) -> BoxFuture<'_, ExchangeResult<Vec<Position>>>;

    /// Place an order; returns the exchange-assigned id.
    fn place_order(
        &self,
        side: OrderSide,
        price: Price,
        size: Size,
        order_type: OrderType,
    ) -> BoxFuture<'_, ExchangeResult<OrderId>>;

    /// Cancel a single order.
    fn cancel_order(&self, id: OrderId) -> BoxFuture<'_, ExchangeResult<()>>;

    /// Cancel every outstanding order on the account.
    fn cancel_all_orders(&self) -> BoxFuture<'_, ExchangeResult<()>>;

    /// Current status of an order.
    fn get_order(&self, id: OrderId) -> BoxFuture<'_, ExchangeResult<OrderStatus>>;

    /// Account collateral, for the telemetry gauge.
    fn collateral(&self) -> BoxFuture<'_, ExchangeResult<Decimal>>;
}

/// Arc wrappers for trait objects.
pub type DynMarketDataClient = Arc<dyn MarketDataClient>;
pub type DynAccountClient = Arc<dyn AccountClient>;
