//! Address accounting.
//!
//! - [`capacity`] - addresses covered by a block
//! - [`usage`] - used/available derivation with anomaly clamping
//! - [`accumulate`] - ordered running totals
//! - [`report`] - per-subnet rows and skipped subnets for one run

mod accumulate;
mod capacity;
mod report;
mod usage;

// Re-export public functions
pub use accumulate::running_totals;
pub use capacity::{capacity, capacity_of_cidr};
pub use report::{build_report, Entry, Report, ReportRow, SkippedSubnet};
pub use usage::{derive_used, subnet_usage, Derived};
