//! Report output port trait.

use std::path::Path;

use crate::domain::engine::Snapshot;
use crate::domain::error::BarsimError;
use crate::domain::metrics::MetricsSummary;
use crate::domain::order::Fill;

/// Port for persisting the outputs of a completed run.
pub trait ReportPort {
    fn write_history(&self, history: &[Snapshot], path: &Path) -> Result<(), BarsimError>;

    fn write_fills(&self, fills: &[Fill], path: &Path) -> Result<(), BarsimError>;

    fn write_metrics(&self, metrics: &MetricsSummary, path: &Path) -> Result<(), BarsimError>;
}
