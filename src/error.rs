//! Errors raised by the address accounting core.
//!
//! Every variant except [`AccountingError::TotalsOverflow`] is local to one
//! subnet: the report records it next to that subnet and moves on.

use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AccountingError {
    #[error("unparsable address block '{block}': {reason}")]
    UnparsableBlock { block: String, reason: String },

    #[error("invalid mask /{mask} for {block}, family allows /0../{max}")]
    InvalidMask { block: String, mask: String, max: u8 },

    #[error("available={available} exceeds capacity={capacity} for {block}")]
    AvailableExceedsCapacity {
        block: String,
        available: u64,
        capacity: u128,
    },

    #[error("capacity of {block} does not fit in 128 bits")]
    CapacityOverflow { block: String },

    #[error("running totals overflowed adding used={used} capacity={capacity}")]
    TotalsOverflow { used: u128, capacity: u128 },
}

impl AccountingError {
    /// True for errors that make the whole report meaningless.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AccountingError::TotalsOverflow { .. })
    }
}
