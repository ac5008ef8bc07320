//! Running accumulation of used/capacity in enumeration order.

use crate::error::AccountingError;
use crate::models::{RunningTotals, SubnetUsage};

impl RunningTotals {
    /// Fold one subnet into the totals, returning the next state.
    ///
    /// Fails closed with [`AccountingError::TotalsOverflow`] instead of
    /// wrapping.
    pub fn fold(self, used: u128, capacity: u128) -> Result<RunningTotals, AccountingError> {
        let overflow = || AccountingError::TotalsOverflow { used, capacity };
        Ok(RunningTotals {
            sum_used: self.sum_used.checked_add(used).ok_or_else(overflow)?,
            sum_capacity: self.sum_capacity.checked_add(capacity).ok_or_else(overflow)?,
        })
    }

    pub fn fold_usage(self, usage: &SubnetUsage) -> Result<RunningTotals, AccountingError> {
        self.fold(usage.used, usage.capacity)
    }
}

/// Fold `(used, capacity)` pairs from (0, 0) and return every intermediate
/// state, one per input, in input order.
pub fn running_totals<I>(pairs: I) -> Result<Vec<RunningTotals>, AccountingError>
where
    I: IntoIterator<Item = (u128, u128)>,
{
    let mut totals = RunningTotals::default();
    pairs
        .into_iter()
        .map(|(used, capacity)| {
            totals = totals.fold(used, capacity)?;
            Ok(totals)
        })
        .collect()
}
