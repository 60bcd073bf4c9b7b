//! Core domain types for the cadence market-making bot.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`, `Size`: precision-safe numeric types
//! - `Execution`, `Position`, `BookLevel`, `Board`: market data
//! - `Quote`, `Order`, `OrderId`: quoting-cycle artifacts

pub mod decimal;
pub mod error;
pub mod market;
pub mod order;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use market::{Board, BookLevel, Execution, Position, PositionSide, Quote};
pub use order::{Order, OrderId, OrderSide, OrderStatus, OrderType};
