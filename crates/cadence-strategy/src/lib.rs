//! Quoting math for the cadence market maker.
//!
//! Pure functions over market snapshots:
//! - `volatility`: population variance and the spread scale `d`
//! - `liquidity`: traded/resting amounts and the microstructure term
//! - `skew`: net position and the inventory offset + flatten signal
//! - `quote`: the unified `QuoteCalculator` tying it together
//!
//! Nothing here performs I/O; the coordinator feeds in snapshots and
//! receives either a `QuoteDecision` or a `Degenerate` outcome.

pub mod config;
pub mod error;
pub mod liquidity;
pub mod quote;
pub mod skew;
pub mod volatility;

pub use config::StrategyConfig;
pub use error::Degenerate;
pub use quote::{QuoteCalculator, QuoteDecision, QuoteInputs, QuoteStats};
pub use skew::{inventory_skew, net_size, InventorySkew};
