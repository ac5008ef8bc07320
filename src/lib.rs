// cargo watch -x 'fmt' -x 'run'  // 'run -- --region eu-west-1'

pub mod accounting;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod output;

use accounting::{build_report, Report};
use config::OutputFormat;
use inventory::InventorySource;
use std::error::Error;
use std::io::Write;

/// Fetch the inventory from `source` and account it, keeping source order.
pub async fn run_report<S: InventorySource>(source: &S) -> Result<Report, Box<dyn Error>> {
    let observations = source.subnets().await?;
    log::info!("# Got subnet count = {}", observations.len());
    let report = build_report(&observations)?;
    Ok(report)
}

/// Render `report` in the requested format. `color` only affects the table.
pub fn write_report<W: Write>(
    report: &Report,
    format: OutputFormat,
    out: &mut W,
    color: bool,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Table => output::write_table(report, out, color)?,
        OutputFormat::Csv => output::write_csv(report, out)?,
    }
    Ok(())
}
