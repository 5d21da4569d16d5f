//! Service layer: cache-freshness tracking, merge reconciliation, the
//! refresh orchestrator, and background dispatch.
//!
//! [`RefreshService`] drives one refresh cycle end to end; the
//! [`FreshnessTracker`] decides when a cycle is due; the
//! [`dispatch::RefreshDispatcher`] decouples the read path from the cycle.

pub mod cleanup;
pub mod dispatch;
pub mod freshness;
pub mod reconcile;
pub mod refresh;

pub use freshness::FreshnessTracker;
pub use refresh::{RefreshOutcome, RefreshService};
