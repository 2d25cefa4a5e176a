#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use barsim::domain::bar::{Bar, BarFeed};
use barsim::domain::error::BarsimError;
use barsim::domain::order::{Order, OrderSide, Quantity};
use barsim::domain::strategy::Strategy;
use chrono::{NaiveDate, NaiveDateTime};

pub fn day_ts(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(day as i64)
}

pub fn make_bar(day: u32, close: f64) -> Bar {
    Bar {
        ts: day_ts(day),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i as u32, c))
        .collect()
}

pub fn feed_from_closes(closes: &[f64]) -> BarFeed {
    BarFeed::new(bars_from_closes(closes)).unwrap()
}

/// Write a daily bar CSV into `dir` and return its path.
pub fn write_bars_csv(dir: &Path, closes: &[f64]) -> PathBuf {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for (i, &close) in closes.iter().enumerate() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64);
        content.push_str(&format!(
            "{},{},{},{},{},1000\n",
            date.format("%Y-%m-%d"),
            close - 1.0,
            close + 1.0,
            close - 2.0,
            close
        ));
    }
    let path = dir.join("bars.csv");
    fs::write(&path, content).unwrap();
    path
}

/// Buys a fixed share count on the first bar, then holds.
pub struct BuyAndHold {
    pub shares: f64,
    bought: bool,
}

impl BuyAndHold {
    pub fn new(shares: f64) -> Self {
        BuyAndHold {
            shares,
            bought: false,
        }
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![("shares".into(), self.shares.to_string())]
    }

    fn reset(&mut self) {
        self.bought = false;
    }

    fn on_bar(&mut self, ts: NaiveDateTime, _bar: &Bar) -> Result<Vec<Order>, BarsimError> {
        if self.bought {
            return Ok(vec![]);
        }
        self.bought = true;
        Ok(vec![Order::market(
            format!("{ts}-entry"),
            ts,
            OrderSide::Buy,
            Quantity::Shares(self.shares),
        )?])
    }
}
