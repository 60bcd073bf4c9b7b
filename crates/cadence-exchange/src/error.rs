//! Error types for exchange client operations.

use cadence_core::OrderSide;
use thiserror::Error;

/// Errors surfaced by market-data and account clients.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Market-data stream ended or dropped.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Exchange rejected an order placement (bad price/size/margin).
    #[error("Order rejected ({side}): {reason}")]
    OrderRejected { side: OrderSide, reason: String },

    /// Exchange rejected a cancel request.
    #[error("Cancel rejected for {id}: {reason}")]
    CancelRejected { id: String, reason: String },

    /// Order id unknown to the exchange.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Account query (positions, collateral) failed.
    #[error("Account error: {0}")]
    Account(String),
}

/// Result type alias for exchange operations.
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
