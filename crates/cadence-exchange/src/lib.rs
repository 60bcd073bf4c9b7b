//! Exchange client contracts for the cadence bot.
//!
//! The quoting core consumes two trait contracts:
//! - `MarketDataClient`: subscription plus snapshot accessors
//! - `AccountClient`: order placement, cancellation, positions
//!
//! Implementations provided here:
//! - `paper::PaperExchange`: deterministic in-process simulation
//! - `mock`: scripted test doubles
//!
//! A live connector (WebSocket feed + signed REST) would implement the
//! same traits; it is a collaborator outside this repository.

pub mod client;
pub mod error;
pub mod mock;
pub mod paper;

pub use client::{
    AccountClient, BoxFuture, DynAccountClient, DynMarketDataClient, MarketDataClient,
};
pub use error::{ExchangeError, ExchangeResult};
pub use paper::{PaperConfig, PaperExchange};
