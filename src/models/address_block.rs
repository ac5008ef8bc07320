//! Address block (CIDR) parsing for IPv4 and IPv6.
//!
//! Provides [`AddressBlock`], the base address plus mask length of a subnet as
//! reported by the provider, e.g. `10.0.1.0/24` or `2600:1f14::/56`.

use crate::error::AccountingError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::IpAddr;
use std::str::FromStr;

/// Maximum mask length for an IPv4 block.
pub const IPV4_BITS: u8 = 32;
/// Maximum mask length for an IPv6 block.
pub const IPV6_BITS: u8 = 128;

/// Contiguous address range: base address plus mask length.
///
/// The mask is always within `0..=family_bits()`; the base address is kept as
/// written, host bits included.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct AddressBlock {
    addr: IpAddr,
    mask: u8,
}

impl AddressBlock {
    /// Build a block from an address and mask, validating the mask.
    fn new(addr: IpAddr, mask: u32) -> Result<AddressBlock, AccountingError> {
        let max = family_bits(&addr);
        if mask > u32::from(max) {
            return Err(AccountingError::InvalidMask {
                block: format!("{addr}/{mask}"),
                mask: mask.to_string(),
                max,
            });
        }
        Ok(AddressBlock {
            addr,
            mask: mask as u8,
        })
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Number of bits in an address of this block's family (32 or 128).
    pub fn family_bits(&self) -> u8 {
        family_bits(&self.addr)
    }
}

fn family_bits(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => IPV4_BITS,
        IpAddr::V6(_) => IPV6_BITS,
    }
}

fn unparsable(block: &str, reason: impl Into<String>) -> AccountingError {
    AccountingError::UnparsableBlock {
        block: block.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for AddressBlock {
    type Err = AccountingError;

    /// Parse standard CIDR notation, `<address>/<mask>`, with no surrounding
    /// whitespace.
    fn from_str(s: &str) -> Result<AddressBlock, AccountingError> {
        let (addr_part, mask_part) = s
            .split_once('/')
            .ok_or_else(|| unparsable(s, "missing '/' between address and mask"))?;

        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| unparsable(s, format!("invalid address '{addr_part}'")))?;

        if mask_part.is_empty() || !mask_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unparsable(s, format!("non-numeric mask '{mask_part}'")));
        }
        // all digits, so the only parse failure left is a mask beyond u32
        let mask: u32 = mask_part.parse().map_err(|_| AccountingError::InvalidMask {
            block: s.to_string(),
            mask: mask_part.to_string(),
            max: family_bits(&addr),
        })?;

        AddressBlock::new(addr, mask)
    }
}

impl Serialize for AddressBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AddressBlock {
    fn deserialize<D>(deserializer: D) -> Result<AddressBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AddressBlock::from_str(&s).map_err(de::Error::custom)
    }
}

impl std::fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
