//! Subnet record as yielded by an inventory source.

use serde::{Deserialize, Serialize};

/// One subnet observation from the provider.
///
/// The address block is kept as the raw string the provider returned so a
/// malformed block can still be reported by name instead of being dropped at
/// deserialisation time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SubnetObservation {
    /// Virtual network (VPC) the subnet belongs to.
    #[serde(default)]
    pub network_id: String,
    /// Provider id of the subnet.
    #[serde(default)]
    pub subnet_id: String,
    /// Display name, from the `Name` tag.
    #[serde(default)]
    pub label: Option<String>,
    /// Address block in CIDR notation.
    pub cidr_block: String,
    /// Provider-reported count of unassigned addresses.
    pub available: u64,
}

impl SubnetObservation {
    pub fn new(label: Option<&str>, cidr_block: &str, available: u64) -> SubnetObservation {
        SubnetObservation {
            label: label.map(str::to_string),
            cidr_block: cidr_block.to_string(),
            available,
            ..Default::default()
        }
    }

    /// Label for display, empty when the subnet has no name.
    pub fn label_or_empty(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}
