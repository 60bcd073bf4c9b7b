//! Market-data window for the cadence bot.
//!
//! The subscription task continuously writes executions and board
//! snapshots into a `MarketWindow`; the trading loop reads copies out.
//! Single writer, many readers, no torn reads.

pub mod window;

pub use window::MarketWindow;
