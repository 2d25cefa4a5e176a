//! CSV file data adapter.

use std::fs::File;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::bar::Bar;
use crate::domain::error::BarsimError;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn data_err(&self, reason: String) -> BarsimError {
        BarsimError::Data {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }

    /// Accepts `YYYY-MM-DD HH:MM:SS` or a bare date, which maps to midnight.
    fn parse_timestamp(&self, s: &str) -> Result<NaiveDateTime, BarsimError> {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(ts);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
            .map_err(|e| self.data_err(format!("invalid timestamp '{s}': {e}")))
    }

    fn column_index(&self, headers: &StringRecord, names: &[&str]) -> Result<usize, BarsimError> {
        headers
            .iter()
            .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
            .ok_or_else(|| self.data_err(format!("missing column (expected one of {names:?})")))
    }

    fn parse_field(&self, record: &StringRecord, idx: usize, name: &str) -> Result<f64, BarsimError> {
        record
            .get(idx)
            .ok_or_else(|| self.data_err(format!("missing {name} field")))?
            .trim()
            .parse()
            .map_err(|e| self.data_err(format!("invalid {name} value: {e}")))
    }
}

impl DataPort for CsvAdapter {
    fn load_bars(&self) -> Result<Vec<Bar>, BarsimError> {
        let file = File::open(&self.path)
            .map_err(|e| self.data_err(format!("failed to open: {e}")))?;
        let mut rdr = csv::Reader::from_reader(file);

        let headers = rdr
            .headers()
            .map_err(|e| self.data_err(format!("failed to read header: {e}")))?
            .clone();
        let ts_idx = self.column_index(&headers, &["timestamp", "datetime", "date"])?;
        let open_idx = self.column_index(&headers, &["open"])?;
        let high_idx = self.column_index(&headers, &["high"])?;
        let low_idx = self.column_index(&headers, &["low"])?;
        let close_idx = self.column_index(&headers, &["close"])?;
        let volume_idx = self.column_index(&headers, &["volume"])?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| self.data_err(format!("CSV parse error: {e}")))?;
            let ts_str = record
                .get(ts_idx)
                .ok_or_else(|| self.data_err("missing timestamp field".into()))?;
            bars.push(Bar {
                ts: self.parse_timestamp(ts_str.trim())?,
                open: self.parse_field(&record, open_idx, "open")?,
                high: self.parse_field(&record, high_idx, "high")?,
                low: self.parse_field(&record, low_idx, "low")?,
                close: self.parse_field(&record, close_idx, "close")?,
                volume: self.parse_field(&record, volume_idx, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.ts);
        Ok(bars)
    }
}
