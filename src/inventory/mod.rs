//! Subnet inventory sources.
//!
//! - [`aws`] - live inventory through the `aws` CLI
//! - [`cache`] - JSON cache in front of a live source
//! - [`cli`] - command execution

mod aws;
mod cache;
mod cli;

use crate::models::SubnetObservation;
use std::error::Error;

// Re-export public types and functions
pub use aws::{
    parse_subnets, parse_vpcs, AwsCli, AwsCliInventory, CommandRunner, Subnet, Tag, Vpc,
};
pub use cache::{
    default_cache_file, read_inventory_cache, write_inventory_cache, CachedInventory,
    InventoryCache,
};

/// Yields subnet observations in enumeration order: network by network, then
/// subnet by subnet within a network.
#[allow(async_fn_in_trait)]
pub trait InventorySource {
    async fn subnets(&self) -> Result<Vec<SubnetObservation>, Box<dyn Error>>;
}

/// Fixed observations, used for replays and tests.
impl InventorySource for Vec<SubnetObservation> {
    async fn subnets(&self) -> Result<Vec<SubnetObservation>, Box<dyn Error>> {
        Ok(self.clone())
    }
}
