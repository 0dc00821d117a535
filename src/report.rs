//! Row building and text/TSV rendering for the driver's output.

use std::str::FromStr;

use thiserror::Error;

use crate::model::cost::Projection;
use crate::model::profile::AppProfile;
use crate::model::scenario::Scenario;

/// Output columns, shared by both formats.
pub const COLUMNS: usize = 13;

/// Number of spaces between aligned columns in text mode.
const PADDING: usize = 3;

pub type Row = [String; COLUMNS];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Column-aligned plain text with a `-` sentinel row under the header.
    Text,
    /// Tab-separated values.
    Tsv,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown output format {0:?}")]
pub struct UnknownFormat(String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

pub fn header() -> Row {
    [
        "Application",
        "GC CPU%",
        "Alloc CPU%",
        "Scenario",
        "B_R",
        "O_R",
        "B_F",
        "O_F",
        "C_R",
        "P_F",
        "ΔCPU%",
        "WB CPU%",
        "ΔAlloc CPU%",
    ]
    .map(String::from)
}

/// One output row: percentages with two decimals, fractions with three,
/// deltas with an explicit sign.
pub fn record(app: &AppProfile, scenario: &Scenario, proj: &Projection) -> Row {
    [
        app.name.to_string(),
        format!("{:.2}%", app.gc_cpu_frac() * 100.0),
        format!("{:.2}%", app.alloc_cpu_frac() * 100.0),
        scenario.name.to_string(),
        format!("{:.3}", scenario.region_alloc_bytes_frac),
        format!("{:.3}", scenario.region_allocs_frac),
        format!("{:.3}", scenario.fade_alloc_bytes_frac),
        format!("{:.3}", scenario.fade_allocs_frac),
        format!("{:.3}", scenario.region_scan_cost_ratio),
        format!("{:.3}", scenario.fade_allocs_pointer_density),
        format!("{:+.2}%", proj.delta_cpu_frac * 100.0),
        format!("{:.2}%", proj.write_barrier_frac * 100.0),
        format!("{:+.2}%", proj.delta_alloc_frac * 100.0),
    ]
}

/// Render rows (header first) in the requested format.
pub fn render(format: OutputFormat, rows: &[Row]) -> String {
    match format {
        OutputFormat::Tsv => {
            let mut out = String::new();
            for row in rows {
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
            out
        }
        OutputFormat::Text => {
            let sentinel: Row = std::array::from_fn(|_| "-".to_string());
            let mut all: Vec<&Row> = Vec::with_capacity(rows.len() + 1);
            if let Some((head, rest)) = rows.split_first() {
                all.push(head);
                all.push(&sentinel);
                all.extend(rest);
            }
            let mut widths = [0usize; COLUMNS];
            for row in &all {
                for (w, cell) in widths.iter_mut().zip(row.iter()) {
                    *w = (*w).max(cell.chars().count());
                }
            }
            let mut out = String::new();
            for row in &all {
                for (i, cell) in row.iter().enumerate() {
                    out.push_str(cell);
                    if i + 1 < COLUMNS {
                        for _ in 0..widths[i] - cell.chars().count() + PADDING {
                            out.push(' ');
                        }
                    }
                }
                out.push('\n');
            }
            out
        }
    }
}
