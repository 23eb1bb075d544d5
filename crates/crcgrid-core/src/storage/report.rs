//! Row report export (plain text, compact hex or markdown)

use crate::error::Result;
use crcgrid_engine::engine::RowOutput;
use std::path::Path;

/// Layout of an exported row report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReportFormat {
    /// `R01: 01 03 00 00 00 0A C5 CD`
    #[default]
    Text,
    /// `01030000000AC5CD`, one frame per line
    Compact,
    /// Markdown table with bytes, CRC and frame columns
    Markdown,
}

impl ReportFormat {
    pub fn from_name(name: &str) -> Option<ReportFormat> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "compact" | "hex" => Some(ReportFormat::Compact),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    /// Pick a format from a file extension, defaulting to text.
    pub fn from_path(path: &Path) -> ReportFormat {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(ReportFormat::from_name)
            .unwrap_or_default()
    }
}

/// Write the row report to a file
pub fn write_report(path: &Path, rows: &[RowOutput], format: ReportFormat) -> Result<()> {
    std::fs::write(path, write_report_content(rows, format))?;
    Ok(())
}

/// Render the row report
pub fn write_report_content(rows: &[RowOutput], format: ReportFormat) -> String {
    let mut out = String::new();

    match format {
        ReportFormat::Text => {
            for row in rows {
                out.push_str(&format!("R{:02}: {}\n", row.row, row.spaced_hex()));
            }
        }
        ReportFormat::Compact => {
            for row in rows {
                out.push_str(&row.compact_hex());
                out.push('\n');
            }
        }
        ReportFormat::Markdown => {
            out.push_str("| Row | Bytes | CRC | Frame |\n");
            out.push_str("|---|---|---|---|\n");
            for row in rows {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    row.row,
                    crcgrid_engine::engine::format_hex_spaced(&row.bytes),
                    row.crc_hex(),
                    row.spaced_hex()
                ));
            }
        }
    }

    out
}
