//! Domain models for the subnet usage report.
//!
//! - [`AddressBlock`] - IPv4/IPv6 address block in CIDR notation
//! - [`SubnetObservation`] - subnet record from the inventory source
//! - [`SubnetUsage`] and [`RunningTotals`] - derived accounting values

mod address_block;
mod observation;
mod usage;

// Re-export public types
pub use address_block::{AddressBlock, IPV4_BITS, IPV6_BITS};
pub use observation::SubnetObservation;
pub use usage::{RunningTotals, SubnetUsage};
