//! Capacity of an address block.
//!
//! Capacity counts every address in the block, network and broadcast
//! included, the same way the provider counts them. The value is a `u128`:
//! exact for every IPv4 mask and every IPv6 mask from /1 up. `::/0` holds
//! 2^128 addresses, one more than `u128::MAX`, and fails with
//! [`AccountingError::CapacityOverflow`].

use crate::error::AccountingError;
use crate::models::AddressBlock;

/// Total number of addresses covered by `block`, `2^(family_bits - mask)`.
pub fn capacity(block: &AddressBlock) -> Result<u128, AccountingError> {
    let host_bits = u32::from(block.family_bits() - block.mask());
    1u128
        .checked_shl(host_bits)
        .ok_or_else(|| AccountingError::CapacityOverflow {
            block: block.to_string(),
        })
}

/// Parse `cidr` and return the block together with its capacity.
pub fn capacity_of_cidr(cidr: &str) -> Result<(AddressBlock, u128), AccountingError> {
    let block: AddressBlock = cidr.parse()?;
    let capacity = capacity(&block)?;
    Ok((block, capacity))
}
