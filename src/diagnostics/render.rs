//! Plain-text rendering of the report.

use super::report::DiagnosticsReport;
use crate::options::NO_VALUE;
use std::fmt;

const OPTION_HEADERS: [&str; 4] = ["Option", "Parsed value", "Raw value", "Source"];

const SOURCE_HEADERS: [&str; 4] = [
    "Name",
    "Raw value used for the current config",
    "Interpreted raw value used for the current config",
    "Current value",
];

fn or_no_value(text: &Option<String>) -> String {
    text.as_deref().unwrap_or(NO_VALUE).to_string()
}

fn write_row<'a, const N: usize>(
    f: &mut fmt::Formatter<'_>,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize; N],
) -> fmt::Result {
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i > 0 {
            f.write_str(" | ")?;
        }
        if i + 1 == N {
            f.write_str(cell)?;
        } else {
            write!(f, "{:<width$}", cell, width = *width)?;
        }
    }
    writeln!(f)
}

/// Left-aligned columns separated by ` | `, with a dashed rule under the header.
fn write_table<const N: usize>(
    f: &mut fmt::Formatter<'_>,
    headers: &[&str; N],
    rows: &[[String; N]],
) -> fmt::Result {
    let mut widths = (*headers).map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(f, headers.iter().copied(), &widths)?;
    let rule_len = widths.iter().sum::<usize>() + 3 * N.saturating_sub(1);
    writeln!(f, "{}", "-".repeat(rule_len))?;
    for row in rows {
        write_row(f, row.iter().map(String::as_str), &widths)?;
    }
    Ok(())
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Configuration snapshot (generation {}, fingerprint {})",
            self.generation,
            self.fingerprint.get(..12).unwrap_or(self.fingerprint.as_str())
        )?;
        writeln!(f)?;

        let rows: Vec<[String; 4]> = self
            .options
            .iter()
            .map(|row| {
                [
                    row.option.clone(),
                    row.parsed_value.clone(),
                    or_no_value(&row.raw_value),
                    row.source.clone(),
                ]
            })
            .collect();
        write_table(f, &OPTION_HEADERS, &rows)?;

        let rejected: Vec<_> = self.options.iter().filter(|row| row.error.is_some()).collect();
        if !rejected.is_empty() {
            writeln!(f)?;
            writeln!(f, "Rejected values (defaults used instead):")?;
            for row in rejected {
                let source = row
                    .rejected_source
                    .map(|source| source.description())
                    .unwrap_or(NO_VALUE);
                writeln!(
                    f,
                    "  {} from {}: {}",
                    row.option,
                    source,
                    row.error.as_deref().unwrap_or_default()
                )?;
            }
        }

        for table in &self.sources {
            writeln!(f)?;
            writeln!(f, "{}:", table.description)?;
            let rows: Vec<[String; 4]> = table
                .rows
                .iter()
                .map(|row| {
                    [
                        row.name.clone(),
                        or_no_value(&row.used_raw),
                        or_no_value(&row.used_interpreted),
                        or_no_value(&row.current),
                    ]
                })
                .collect();
            write_table(f, &SOURCE_HEADERS, &rows)?;
        }

        Ok(())
    }
}
