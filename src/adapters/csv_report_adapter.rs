//! CSV report adapter.
//!
//! Writes the run history, fill log and metrics summary as plain CSV files
//! next to each other, one file per call.

use std::path::Path;

use crate::domain::engine::Snapshot;
use crate::domain::error::BarsimError;
use crate::domain::metrics::MetricsSummary;
use crate::domain::order::Fill;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

fn report_err(path: &Path, e: csv::Error) -> BarsimError {
    BarsimError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_history(&self, history: &[Snapshot], path: &Path) -> Result<(), BarsimError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;
        wtr.write_record(["ts", "price", "position", "cash", "equity", "drawdown"])
            .map_err(|e| report_err(path, e))?;
        for snap in history {
            wtr.write_record([
                snap.ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                snap.price.to_string(),
                snap.position.to_string(),
                snap.cash.to_string(),
                snap.equity.to_string(),
                snap.drawdown.to_string(),
            ])
            .map_err(|e| report_err(path, e))?;
        }
        wtr.flush().map_err(BarsimError::Io)?;
        Ok(())
    }

    fn write_fills(&self, fills: &[Fill], path: &Path) -> Result<(), BarsimError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;
        wtr.write_record(["order_id", "ts", "price", "qty", "commission"])
            .map_err(|e| report_err(path, e))?;
        for fill in fills {
            wtr.write_record([
                fill.order_id.clone(),
                fill.ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                fill.price.to_string(),
                fill.qty.to_string(),
                fill.commission.to_string(),
            ])
            .map_err(|e| report_err(path, e))?;
        }
        wtr.flush().map_err(BarsimError::Io)?;
        Ok(())
    }

    fn write_metrics(&self, metrics: &MetricsSummary, path: &Path) -> Result<(), BarsimError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;
        wtr.write_record(["metric", "value"])
            .map_err(|e| report_err(path, e))?;
        for (name, value) in metrics.to_pairs() {
            wtr.write_record([name.to_string(), value.to_string()])
                .map_err(|e| report_err(path, e))?;
        }
        wtr.flush().map_err(BarsimError::Io)?;
        Ok(())
    }
}
