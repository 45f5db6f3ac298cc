//! Duration reconciliation
//!
//! Re-probes catalog entries whose stored duration is missing, zero or the historic
//! placeholder, and writes back the verified value.

mod service;
mod throttle;

pub use service::{
    CollectionSummary, ReconcileError, ReconcileOptions, ReconciliationJob, ReconciliationReport,
};
pub use throttle::MinIntervalThrottle;
