//! Used/available derivation.

use crate::accounting::capacity::capacity_of_cidr;
use crate::error::AccountingError;
use crate::models::{AddressBlock, SubnetObservation, SubnetUsage};

/// Result of [`derive_used`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    pub used: u128,
    pub anomaly: Option<AccountingError>,
}

/// `used = capacity - available`.
///
/// A provider count above capacity is a data anomaly: `used` is clamped to 0
/// and the anomaly is returned with it instead of wrapping around.
pub fn derive_used(block: &AddressBlock, capacity: u128, available: u64) -> Derived {
    match capacity.checked_sub(u128::from(available)) {
        Some(used) => Derived { used, anomaly: None },
        None => Derived {
            used: 0,
            anomaly: Some(AccountingError::AvailableExceedsCapacity {
                block: block.to_string(),
                available,
                capacity,
            }),
        },
    }
}

/// Parse the observation's block and derive its [`SubnetUsage`].
///
/// Fails for blocks that cannot be accounted (unparsable, bad mask, capacity
/// not representable); an anomalous available count is carried in the result.
pub fn subnet_usage(obs: &SubnetObservation) -> Result<SubnetUsage, AccountingError> {
    let (block, capacity) = capacity_of_cidr(&obs.cidr_block)?;
    let Derived { used, anomaly } = derive_used(&block, capacity, obs.available);
    if let Some(anomaly) = &anomaly {
        log::warn!(
            "subnet '{}' {}: {anomaly}, used clamped to 0",
            obs.label_or_empty(),
            obs.subnet_id
        );
    }
    Ok(SubnetUsage {
        label: obs.label.clone(),
        block,
        available: obs.available,
        used,
        capacity,
        anomaly,
    })
}
