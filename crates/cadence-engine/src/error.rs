//! Engine error taxonomy.
//!
//! Only two error classes are fatal to a cycle: fetch failures and
//! submit rejections. Both trigger cancel-all recovery and propagate to
//! the supervisor. Cancel failures during cleanup are logged where they
//! happen and never escalate; degenerate computations are a skip
//! outcome, not an error (see `CycleOutcome::Skipped`).

use cadence_exchange::ExchangeError;
use thiserror::Error;

/// A failure that aborts the current cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Position/board/execution/status retrieval failed.
    #[error("Data fetch failed: {0}")]
    DataFetch(#[source] ExchangeError),

    /// Exchange rejected an order placement.
    #[error("Order submit failed: {0}")]
    OrderSubmit(#[source] ExchangeError),
}

/// A failure that ends a subscribe+trade session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The market-data subscription dropped.
    #[error("Market data subscription failed: {0}")]
    Subscription(#[from] ExchangeError),

    /// A trading cycle failed after recovery ran.
    #[error("Trading cycle failed: {0}")]
    Cycle(#[from] CycleError),
}

pub type CycleResult<T> = Result<T, CycleError>;
pub type EngineResult<T> = Result<T, EngineError>;
