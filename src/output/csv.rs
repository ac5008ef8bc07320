//! CSV output of the report.

use crate::accounting::{Entry, Report};
use itertools::Itertools;
use std::io::{self, Write};

const CSV_HEADER: &str = "name,subnet,used,available,size,sum_used,sum_max,anomaly";

/// Quote a field when it holds a comma or a double quote.
fn escape_csv_field(input: &str) -> String {
    if input.contains(',') || input.contains('"') {
        // excel does not like spaces after the comma either, none are added
        format!("\"{}\"", input.replace('"', "\"\""))
    } else {
        input.to_string()
    }
}

fn entry_fields(entry: Entry<'_>) -> [String; 8] {
    match entry {
        Entry::Accounted(row) => {
            let u = &row.usage;
            [
                u.label.clone().unwrap_or_default(),
                u.block.to_string(),
                u.used.to_string(),
                u.available.to_string(),
                u.capacity.to_string(),
                row.running.sum_used.to_string(),
                row.running.sum_capacity.to_string(),
                u.anomaly.as_ref().map(|a| a.to_string()).unwrap_or_default(),
            ]
        }
        // numeric fields stay empty, the subnet never entered the totals
        Entry::Skipped(skipped) => {
            let obs = &skipped.observation;
            [
                obs.label_or_empty().to_string(),
                obs.cidr_block.clone(),
                String::new(),
                obs.available.to_string(),
                String::new(),
                String::new(),
                String::new(),
                format!("skipped: {}", skipped.error),
            ]
        }
    }
}

/// Write one line per subnet in source order, skipped subnets included.
pub fn write_csv<W: Write>(report: &Report, out: &mut W) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for entry in report.entries() {
        let fields = entry_fields(entry);
        writeln!(out, "{}", fields.iter().map(|f| escape_csv_field(f)).join(","))?;
    }
    Ok(())
}
