//! Report assembly: account every observation and fold the running totals.

use crate::accounting::usage::subnet_usage;
use crate::error::AccountingError;
use crate::models::{RunningTotals, SubnetObservation, SubnetUsage};
use itertools::Itertools;
use serde::Serialize;

/// One report row: a subnet and the running totals including it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Position of the subnet in the source enumeration.
    pub index: usize,
    pub usage: SubnetUsage,
    pub running: RunningTotals,
}

/// A subnet that could not be accounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSubnet {
    /// Position of the subnet in the source enumeration.
    pub index: usize,
    pub observation: SubnetObservation,
    pub error: AccountingError,
}

/// One line of the report, accounted or skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    Accounted(&'a ReportRow),
    Skipped(&'a SkippedSubnet),
}

impl Entry<'_> {
    pub fn index(&self) -> usize {
        match self {
            Entry::Accounted(row) => row.index,
            Entry::Skipped(skipped) => skipped.index,
        }
    }
}

/// Accounted rows in enumeration order, plus what was skipped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub skipped: Vec<SkippedSubnet>,
    pub totals: RunningTotals,
}

impl Report {
    /// Rows whose provider data was inconsistent.
    pub fn warnings(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| r.usage.anomaly.is_some())
    }

    /// Accounted and skipped subnets interleaved back into source order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.rows
            .iter()
            .map(Entry::Accounted)
            .merge_by(self.skipped.iter().map(Entry::Skipped), |a, b| {
                a.index() < b.index()
            })
    }
}

/// Account one observation and fold it into `totals`.
fn account(
    obs: &SubnetObservation,
    totals: RunningTotals,
) -> Result<(SubnetUsage, RunningTotals), AccountingError> {
    let usage = subnet_usage(obs)?;
    let totals = totals.fold_usage(&usage)?;
    Ok((usage, totals))
}

/// Build the report from observations in the order the source yielded them.
///
/// Per-subnet failures land in [`Report::skipped`] and the pass continues;
/// a fatal error (see [`AccountingError::is_fatal`]) aborts the report.
pub fn build_report<'a, I>(observations: I) -> Result<Report, AccountingError>
where
    I: IntoIterator<Item = &'a SubnetObservation>,
{
    let mut report = Report::default();

    for (index, obs) in observations.into_iter().enumerate() {
        match account(obs, report.totals) {
            Ok((usage, totals)) => {
                log::trace!(
                    "{} used={} cap={} => {:?}",
                    usage.block,
                    usage.used,
                    usage.capacity,
                    totals
                );
                report.totals = totals;
                report.rows.push(ReportRow {
                    index,
                    usage,
                    running: totals,
                });
            }
            Err(error) if error.is_fatal() => {
                log::error!(
                    "abort report at subnet #{index} '{}' [{}]: {error}",
                    obs.label_or_empty(),
                    obs.cidr_block
                );
                return Err(error);
            }
            Err(error) => {
                log::warn!(
                    "skip subnet '{}' {} [{}]: {error}",
                    obs.label_or_empty(),
                    obs.subnet_id,
                    obs.cidr_block
                );
                report.skipped.push(SkippedSubnet {
                    index,
                    observation: obs.clone(),
                    error,
                });
            }
        }
    }

    log::info!(
        "report: {} rows, {} skipped, {} anomalies, used {}/{}",
        report.rows.len(),
        report.skipped.len(),
        report.warnings().count(),
        report.totals.sum_used,
        report.totals.sum_capacity
    );
    Ok(report)
}
