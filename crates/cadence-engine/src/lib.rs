//! Quoting engine: the order cycle coordinator and its supervisor.
//!
//! ```text
//! Supervisor (restart forever)
//!   ├─ MarketDataClient::subscribe   (continuous window writer)
//!   ├─ trade loop (fixed timer) ──► CycleCoordinator::run_cycle
//!   │     Idle → Quoting → Submitting → Holding → Reconciling → Idle
//!   │                      └── ErrorRecovery: cancel-all + propagate
//!   └─ collateral gauge (~1 min, never fatal)
//! ```

pub mod coordinator;
pub mod error;
pub mod scheduler;

pub use coordinator::{
    CycleConfig, CycleCoordinator, CycleOutcome, LegPolicy, LegReport,
};
pub use error::{CycleError, CycleResult, EngineError, EngineResult};
pub use scheduler::{Supervisor, SupervisorConfig};
