//! Performance metrics over an equity curve.

use std::fmt;

use super::error::BarsimError;

/// Bar sampling frequency, used to annualize returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Hourly,
    Minute,
}

impl Frequency {
    pub fn annualization_factor(self) -> f64 {
        match self {
            Frequency::Daily => 252.0,
            Frequency::Hourly => 252.0 * 6.5,
            Frequency::Minute => 252.0 * 390.0,
        }
    }

    pub fn parse(s: &str) -> Result<Self, BarsimError> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "hourly" | "h" => Ok(Frequency::Hourly),
            "minute" | "min" => Ok(Frequency::Minute),
            other => Err(BarsimError::ConfigInvalid {
                section: "backtest".into(),
                key: "frequency".into(),
                reason: format!("unknown frequency '{other}' (expected daily, hourly or minute)"),
            }),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Hourly => write!(f, "hourly"),
            Frequency::Minute => write!(f, "minute"),
        }
    }
}

/// Summary statistics for one equity curve. Degenerate inputs produce NaN
/// sentinels (or +inf for `profit_factor`), never errors.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub total_return: f64,
    pub cagr: f64,
    pub ann_vol: f64,
    pub sharpe: f64,
    pub max_dd: f64,
    pub calmar: f64,
    pub hit_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
}

impl MetricsSummary {
    fn all_nan() -> Self {
        MetricsSummary {
            total_return: f64::NAN,
            cagr: f64::NAN,
            ann_vol: f64::NAN,
            sharpe: f64::NAN,
            max_dd: f64::NAN,
            calmar: f64::NAN,
            hit_rate: f64::NAN,
            avg_win: f64::NAN,
            avg_loss: f64::NAN,
            profit_factor: f64::NAN,
        }
    }

    /// Fixed key set for external consumers, in stable order.
    pub fn to_pairs(&self) -> [(&'static str, f64); 10] {
        [
            ("total_return", self.total_return),
            ("cagr", self.cagr),
            ("ann_vol", self.ann_vol),
            ("sharpe", self.sharpe),
            ("max_dd", self.max_dd),
            ("calmar", self.calmar),
            ("hit_rate", self.hit_rate),
            ("avg_win", self.avg_win),
            ("avg_loss", self.avg_loss),
            ("profit_factor", self.profit_factor),
        ]
    }
}

pub(crate) fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Compute summary statistics from an equity curve sampled at `freq`.
///
/// Non-finite equity values are dropped up front; an empty remainder yields
/// the all-NaN summary. Per-period simple returns carry a leading 0.0 for
/// the first observation.
pub fn compute_metrics(equity: &[f64], freq: Frequency, rf: f64) -> MetricsSummary {
    let equity: Vec<f64> = equity.iter().copied().filter(|v| v.is_finite()).collect();
    if equity.is_empty() {
        return MetricsSummary::all_nan();
    }

    let mut returns = Vec::with_capacity(equity.len());
    returns.push(0.0);
    for w in equity.windows(2) {
        returns.push(w[1] / w[0] - 1.0);
    }

    let ann = freq.annualization_factor();
    let first = equity[0];
    let last = equity[equity.len() - 1];

    let total_return = last / first - 1.0;

    let n_periods = (equity.len() - 1).max(1) as f64;
    let years = n_periods / ann;
    let cagr = (last / first).powf(1.0 / years) - 1.0;

    let ann_vol = if returns.len() > 1 {
        population_std(&returns) * ann.sqrt()
    } else {
        f64::NAN
    };

    let excess: Vec<f64> = returns.iter().map(|r| r - rf / ann).collect();
    let excess_std = population_std(&excess);
    let sharpe = if excess_std > 0.0 {
        let excess_mean = excess.iter().sum::<f64>() / excess.len() as f64;
        excess_mean / excess_std * ann.sqrt()
    } else {
        f64::NAN
    };

    let mut running_max = f64::NEG_INFINITY;
    let mut max_dd = f64::INFINITY;
    for &e in &equity {
        running_max = running_max.max(e);
        let dd = if running_max == 0.0 {
            0.0
        } else {
            (e - running_max) / running_max
        };
        max_dd = max_dd.min(dd);
    }
    let calmar = if max_dd < 0.0 {
        cagr / max_dd.abs()
    } else {
        f64::NAN
    };

    let wins: Vec<f64> = returns.iter().copied().filter(|&r| r > 0.0).collect();
    let losses: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let hit_rate = wins.len() as f64 / (wins.len() + losses.len()).max(1) as f64;
    let avg_win = if wins.is_empty() {
        0.0
    } else {
        wins.iter().sum::<f64>() / wins.len() as f64
    };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        losses.iter().sum::<f64>() / losses.len() as f64
    };
    let loss_sum: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if loss_sum > 0.0 {
        wins.iter().sum::<f64>() / loss_sum
    } else {
        f64::INFINITY
    };

    MetricsSummary {
        total_return,
        cagr,
        ann_vol,
        sharpe,
        max_dd,
        calmar,
        hit_rate,
        avg_win,
        avg_loss,
        profit_factor,
    }
}
