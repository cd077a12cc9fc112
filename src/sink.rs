use crate::aggregator::CombinedTable;
use crate::error::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;
pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.025;

/// Valuation inputs carried alongside the table for the downstream report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationAssumptions {
    pub discount_rate: f64,
    pub terminal_growth: f64,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            discount_rate: DEFAULT_DISCOUNT_RATE,
            terminal_growth: DEFAULT_TERMINAL_GROWTH,
        }
    }
}

/// Persists the combined table. Returns the path actually written.
pub trait TableSink {
    fn write(
        &self,
        table: &CombinedTable,
        assumptions: &ValuationAssumptions,
        path: &Path,
    ) -> Result<PathBuf>;
}

/// Plain CSV: a `type` column, the present presentation columns, then the assumptions
/// as trailing two-column rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

impl CsvSink {
    pub fn write_to<W: Write>(
        &self,
        table: &CombinedTable,
        assumptions: &ValuationAssumptions,
        writer: W,
    ) -> Result<()> {
        let columns = table.present_columns();
        let mut csv = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        let mut header = vec!["type"];
        header.extend(columns.iter().copied());
        csv.write_record(&header)?;

        for row in &table.rows {
            let mut record = vec![row.kind().to_string()];
            record.extend(
                columns
                    .iter()
                    .map(|column| row.cell(column).map(|c| c.to_string()).unwrap_or_default()),
            );
            csv.write_record(&record)?;
        }

        csv.write_record(["assumption", "value"])?;
        let discount_rate = assumptions.discount_rate.to_string();
        let terminal_growth = assumptions.terminal_growth.to_string();
        csv.write_record(["discount_rate", discount_rate.as_str()])?;
        csv.write_record(["terminal_growth", terminal_growth.as_str()])?;
        csv.flush()?;
        Ok(())
    }
}

impl TableSink for CsvSink {
    fn write(
        &self,
        table: &CombinedTable,
        assumptions: &ValuationAssumptions,
        path: &Path,
    ) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.write_to(table, assumptions, file)?;

        info!("Wrote {} rows to {}", table.rows.len(), path.display());
        Ok(path.to_path_buf())
    }
}
