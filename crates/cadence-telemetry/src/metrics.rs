//! Prometheus metrics for the cadence bot.
//!
//! Gauges and counters for the quoting loop: cycle outcomes, order
//! submissions, recovery cancel-alls, quote shape, and the periodic
//! collateral gauge.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration
//! failure means duplicate metric names, a fatal configuration error
//! that should crash at startup rather than fail silently. These
//! panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter,
};

/// Completed cycles, labeled by outcome (quoted/skipped/flattened/error).
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "cadence_cycles_total",
        "Completed quoting cycles by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Orders submitted, labeled by side.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "cadence_orders_submitted_total",
        "Orders submitted by side",
        &["side"]
    )
    .unwrap()
});

/// Recovery cancel-all invocations.
pub static CANCEL_ALL_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "cadence_cancel_all_total",
        "Account-wide cancel-all invocations during error recovery"
    )
    .unwrap()
});

/// Supervisor session restarts.
pub static RESTARTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "cadence_restarts_total",
        "Subscribe+trade session restarts after a failure"
    )
    .unwrap()
});

/// Most recent quoted spread.
pub static QUOTE_SPREAD: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("cadence_quote_spread", "Most recent computed spread").unwrap()
});

/// Most recent inventory offset.
pub static QUOTE_OFFSET: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "cadence_quote_offset",
        "Most recent inventory skew offset"
    )
    .unwrap()
});

/// Account collateral, written on an independent cadence.
pub static COLLATERAL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("cadence_collateral", "Account collateral").unwrap()
});

/// Facade for metric writes, so call sites stay one-liners.
pub struct Metrics;

impl Metrics {
    pub fn cycle(outcome: &str) {
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn order_submitted(side: &str) {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&[side]).inc();
    }

    pub fn cancel_all() {
        CANCEL_ALL_TOTAL.inc();
    }

    pub fn restart() {
        RESTARTS_TOTAL.inc();
    }

    pub fn quote_shape(spread: f64, offset: f64) {
        QUOTE_SPREAD.set(spread);
        QUOTE_OFFSET.set(offset);
    }

    pub fn collateral(value: f64) {
        COLLATERAL.set(value);
    }
}
