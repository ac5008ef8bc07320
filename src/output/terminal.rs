//! Table output for the terminal.

use crate::accounting::{Entry, Report, ReportRow};
use colored::Colorize;
use itertools::Itertools;
use std::io::{self, Write};

const HEADER: [&str; 7] = [
    "Name",
    "Subnet",
    "Used",
    "Available",
    "Size",
    "Sum Used",
    "Sum Max",
];

/// Cells of one line. `!` marks a clamped `Used` value, `-` fills the
/// numbers of a skipped subnet.
fn entry_cells(entry: Entry<'_>) -> [String; 7] {
    match entry {
        Entry::Accounted(row) => {
            let u = &row.usage;
            let used = if u.anomaly.is_some() {
                format!("{}!", u.used)
            } else {
                u.used.to_string()
            };
            [
                u.label.clone().unwrap_or_default(),
                u.block.to_string(),
                used,
                u.available.to_string(),
                u.capacity.to_string(),
                row.running.sum_used.to_string(),
                row.running.sum_capacity.to_string(),
            ]
        }
        Entry::Skipped(skipped) => {
            let obs = &skipped.observation;
            let dash = || "-".to_string();
            [
                obs.label_or_empty().to_string(),
                obs.cidr_block.clone(),
                dash(),
                obs.available.to_string(),
                dash(),
                dash(),
                dash(),
            ]
        }
    }
}

fn separator(widths: &[usize]) -> String {
    format!("+{}+", widths.iter().map(|w| "-".repeat(w + 2)).join("+"))
}

/// Name and subnet left aligned, numbers right aligned.
fn format_line(cells: &[String], widths: &[usize]) -> String {
    let cols = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (c, &w))| {
            if i < 2 {
                format!(" {c:<w$} ")
            } else {
                format!(" {c:>w$} ")
            }
        })
        .join("|");
    format!("|{cols}|")
}

/// Section title, highlighted only when `color` is set.
fn title(text: &str, color: bool, paint: fn(&str) -> colored::ColoredString) -> String {
    if color {
        paint(text).to_string()
    } else {
        text.to_string()
    }
}

/// Render the report as a table in source order, followed by warnings and
/// skipped subnets. `color` adds ANSI highlighting and should only be set
/// when `out` is a terminal.
pub fn write_table<W: Write>(report: &Report, out: &mut W, color: bool) -> io::Result<()> {
    let header: Vec<String> = HEADER.iter().map(|h| h.to_uppercase()).collect();
    let rows: Vec<[String; 7]> = report.entries().map(entry_cells).collect();

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for cells in &rows {
        for (w, c) in widths.iter_mut().zip(cells.iter()) {
            *w = (*w).max(c.chars().count());
        }
    }

    let sep = separator(&widths);
    writeln!(out, "{sep}")?;
    writeln!(out, "{}", format_line(&header, &widths))?;
    writeln!(out, "{sep}")?;
    for cells in &rows {
        writeln!(out, "{}", format_line(cells, &widths))?;
    }
    writeln!(out, "{sep}")?;

    let warnings: Vec<&ReportRow> = report.warnings().collect();
    if !warnings.is_empty() {
        let tag = title("WARN", color, |t| t.on_yellow());
        writeln!(out, "{tag} {} subnet(s):", warnings.len())?;
        for row in warnings {
            if let Some(anomaly) = &row.usage.anomaly {
                writeln!(
                    out,
                    "  ! '{}' {anomaly}, used shown as {}",
                    row.usage.label.as_deref().unwrap_or(""),
                    row.usage.used
                )?;
            }
        }
    }
    if !report.skipped.is_empty() {
        let tag = title("SKIPPED", color, |t| t.on_red());
        writeln!(out, "{tag} {} subnet(s):", report.skipped.len())?;
        for skipped in &report.skipped {
            writeln!(
                out,
                "  - '{}' {}: {}",
                skipped.observation.label_or_empty(),
                skipped.observation.subnet_id,
                skipped.error
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::build_report;
    use crate::models::SubnetObservation;

    fn render(input: &[SubnetObservation]) -> String {
        let report = build_report(input).unwrap();
        let mut out = Vec::new();
        write_table(&report, &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_table_rows() {
        let out = render(&[
            SubnetObservation::new(Some("app-a"), "10.0.1.0/24", 200),
            SubnetObservation::new(None, "10.0.2.0/28", 10),
        ]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[1],
            "| NAME  | SUBNET      | USED | AVAILABLE | SIZE | SUM USED | SUM MAX |"
        );
        assert_eq!(
            lines[3],
            "| app-a | 10.0.1.0/24 |   56 |       200 |  256 |       56 |     256 |"
        );
        assert_eq!(
            lines[4],
            "|       | 10.0.2.0/28 |    6 |        10 |   16 |       62 |     272 |"
        );
        assert_eq!(lines[0], lines[5]);
        assert!(!out.contains("WARN"));
    }

    #[test]
    fn test_table_flags_anomaly_and_skipped() {
        let out = render(&[
            SubnetObservation::new(Some("odd"), "10.0.1.0/24", 300),
            SubnetObservation::new(Some("broken"), "10.0.3.0/99", 1),
        ]);
        assert!(out.contains("|   0! |"), "{out}");
        assert!(out.contains("! 'odd' available=300 exceeds capacity=256"), "{out}");
        assert!(out.contains("- 'broken' : invalid mask /99"), "{out}");
    }

    #[test]
    fn test_table_skipped_row_in_place() {
        let out = render(&[
            SubnetObservation::new(Some("first"), "10.0.1.0/24", 200),
            SubnetObservation::new(Some("typo"), "10.0.2.0/2x", 7),
            SubnetObservation::new(Some("third"), "10.0.3.0/28", 10),
        ]);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[3].starts_with("| first "), "{out}");
        assert_eq!(
            lines[4],
            "| typo  | 10.0.2.0/2x |    - |         7 |    - |        - |       - |"
        );
        assert!(lines[5].starts_with("| third "), "{out}");
    }

    #[test]
    fn test_table_without_color_has_no_escapes() {
        let report = build_report(&[
            SubnetObservation::new(Some("odd"), "10.0.1.0/24", 300),
            SubnetObservation::new(Some("broken"), "10.0.3.0", 1),
        ])
        .unwrap();
        let mut out = Vec::new();
        write_table(&report, &mut out, false).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(!out.contains('\x1b'), "{out:?}");
        assert!(out.contains("WARN 1 subnet(s):"), "{out}");
        assert!(out.contains("SKIPPED 1 subnet(s):"), "{out}");
    }
}
