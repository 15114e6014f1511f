//! Pipeline entry points for tracker operations.
//!
//! - `run_tracker`: Poll every provider until shutdown
//! - `run_check`: Poll every provider once

pub mod check;
pub mod monitor;
pub mod shutdown;
pub mod tracker;

pub use check::run_check;
pub use monitor::{CycleOutcome, MonitorStats, ProviderMonitor};
pub use tracker::{TrackerSummary, run_monitors, run_tracker};
