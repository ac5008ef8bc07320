//! Derived per-subnet usage and the running totals folded over them.

use super::AddressBlock;
use crate::error::AccountingError;
use serde::Serialize;

/// Usage of one subnet, derived once and never mutated.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetUsage {
    pub label: Option<String>,
    pub block: AddressBlock,
    pub available: u64,
    /// `capacity - available`, clamped to 0 when the provider count is too high.
    pub used: u128,
    /// `2^(family_bits - mask)`, every address in the block.
    pub capacity: u128,
    /// Data-quality problem found while deriving `used`.
    #[serde(serialize_with = "serialize_anomaly")]
    pub anomaly: Option<AccountingError>,
}

fn serialize_anomaly<S>(anomaly: &Option<AccountingError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    match anomaly {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Cumulative used/capacity over the subnets folded so far.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunningTotals {
    pub sum_used: u128,
    pub sum_capacity: u128,
}

impl RunningTotals {
    pub fn new(sum_used: u128, sum_capacity: u128) -> RunningTotals {
        RunningTotals {
            sum_used,
            sum_capacity,
        }
    }
}
