//! Shared market-data window.
//!
//! One `MarketWindow` per instrument holds the trailing execution history
//! and the latest board snapshot. The subscription task is the only
//! writer; the trading loop reads through copy-based accessors so it can
//! never observe a torn update.

use std::collections::VecDeque;

use cadence_core::{Board, Execution};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct WindowInner {
    /// Trailing executions, oldest first.
    executions: VecDeque<Execution>,
    /// Latest board snapshot.
    board: Option<Board>,
    /// Time of the last write, either kind.
    last_update: Option<DateTime<Utc>>,
}

/// Single-writer, multi-reader store of recent market data.
#[derive(Debug)]
pub struct MarketWindow {
    inner: RwLock<WindowInner>,
    /// Executions older than this are pruned on write.
    retention: Duration,
}

impl MarketWindow {
    /// Create a window retaining executions for `retention`.
    pub fn new(retention: Duration) -> Self {
        Self {
            inner: RwLock::new(WindowInner::default()),
            retention,
        }
    }

    /// Record a trade print and prune expired history.
    ///
    /// Writer side only; called by the subscription task.
    pub fn push_execution(&self, execution: Execution) {
        let mut inner = self.inner.write();
        let now = execution.timestamp;
        inner.executions.push_back(execution);

        let cutoff = now - self.retention;
        while inner
            .executions
            .front()
            .is_some_and(|e| e.timestamp < cutoff)
        {
            inner.executions.pop_front();
        }
        inner.last_update = Some(now);
    }

    /// Replace the board snapshot.
    pub fn set_board(&self, board: Board) {
        let mut inner = self.inner.write();
        debug!(mid = %board.mid, "board updated");
        inner.board = Some(board);
        inner.last_update = Some(Utc::now());
    }

    /// Executions within the trailing `window`, ordered most-recent-last.
    ///
    /// Returns an owned copy; each call re-reads the store, so results
    /// are restartable and never alias the writer's state.
    pub fn recent_executions(&self, window: Duration) -> Vec<Execution> {
        let inner = self.inner.read();
        let cutoff = Utc::now() - window;
        inner
            .executions
            .iter()
            .filter(|e| e.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Copy of the current board snapshot, if any has arrived.
    pub fn board(&self) -> Option<Board> {
        self.inner.read().board.clone()
    }

    /// Age of the newest data, if any.
    pub fn age(&self) -> Option<Duration> {
        self.inner.read().last_update.map(|t| Utc::now() - t)
    }

    /// Number of retained executions (pruned or not yet expired).
    pub fn execution_count(&self) -> usize {
        self.inner.read().executions.len()
    }

    /// Drop all state, as after a resubscribe.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.executions.clear();
        inner.board = None;
        inner.last_update = None;
    }
}
