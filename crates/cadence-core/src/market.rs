//! Market data types.
//!
//! Executions (trade prints), positions, book levels, and the board
//! snapshot the quoting cycle reads each tick.

use crate::{Price, Size};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable trade print from market data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub price: Price,
    pub size: Size,
    pub timestamp: DateTime<Utc>,
}

impl Execution {
    pub fn new(price: Price, size: Size, timestamp: DateTime<Utc>) -> Self {
        Self {
            price,
            size,
            timestamp,
        }
    }
}

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// An open position as reported by the account client.
///
/// The source of truth lives on the exchange; this is polled fresh each
/// cycle and never cached across ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub size: Size,
}

impl Position {
    pub fn new(side: PositionSide, size: Size) -> Self {
        Self { side, size }
    }

    /// Signed size: long positive, short negative.
    pub fn signed_size(&self) -> Size {
        match self.side {
            PositionSide::Long => self.size,
            PositionSide::Short => -self.size,
        }
    }
}

/// Resting liquidity at one price level, read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Size,
}

impl BookLevel {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

/// Snapshot of the board: mid price plus resting levels on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub mid: Price,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl Board {
    pub fn new(mid: Price, bids: Vec<BookLevel>, asks: Vec<BookLevel>) -> Self {
        Self { mid, bids, asks }
    }

    /// A board without a positive mid cannot anchor a quote.
    pub fn has_mid(&self) -> bool {
        self.mid.is_positive()
    }
}

/// A computed bid/ask pair, recomputed every cycle and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub bid_price: Price,
    pub ask_price: Price,
    pub size: Size,
}

impl Quote {
    pub fn new(bid_price: Price, ask_price: Price, size: Size) -> Self {
        Self {
            bid_price,
            ask_price,
            size,
        }
    }

    /// Quoted spread: ask - bid. Invariant: never negative.
    pub fn spread(&self) -> Price {
        self.ask_price - self.bid_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_size() {
        let long = Position::new(PositionSide::Long, Size::new(dec!(1.0)));
        let short = Position::new(PositionSide::Short, Size::new(dec!(0.4)));
        assert_eq!(long.signed_size(), Size::new(dec!(1.0)));
        assert_eq!(short.signed_size(), Size::new(dec!(-0.4)));
    }

    #[test]
    fn test_board_has_mid() {
        let board = Board::new(Price::new(dec!(100)), vec![], vec![]);
        assert!(board.has_mid());
        let empty = Board::new(Price::ZERO, vec![], vec![]);
        assert!(!empty.has_mid());
    }

    #[test]
    fn test_quote_spread() {
        let q = Quote::new(
            Price::new(dec!(99)),
            Price::new(dec!(101)),
            Size::new(dec!(0.01)),
        );
        assert_eq!(q.spread(), Price::new(dec!(2)));
    }
}
