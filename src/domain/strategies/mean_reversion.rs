//! Mean-reversion strategy over a rolling z-score band.

use chrono::NaiveDateTime;

use crate::domain::bar::Bar;
use crate::domain::error::BarsimError;
use crate::domain::order::{Order, OrderSide, Quantity};
use crate::domain::strategy::{Stance, Strategy};

/// Enters against moves beyond `entry_z` standard deviations from the
/// rolling mean and exits once the z-score re-enters the `exit_z` band.
/// Optional stop-loss and take-profit act on the entry price; a cooldown
/// suppresses new signals for a fixed number of bars after an exit.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    pub window: usize,
    pub entry_z: f64,
    pub exit_z: f64,
    pub size_pct: f64,
    pub stop_pct: Option<f64>,
    pub tp_pct: Option<f64>,
    pub cooldown: usize,
    pub allow_short: bool,

    prices: Vec<f64>,
    stance: Stance,
    entry_price: Option<f64>,
    cool: usize,
}

impl MeanReversion {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        window: usize,
        entry_z: f64,
        exit_z: f64,
        size_pct: f64,
        stop_pct: Option<f64>,
        tp_pct: Option<f64>,
        cooldown: usize,
        allow_short: bool,
    ) -> Self {
        MeanReversion {
            window,
            entry_z,
            exit_z,
            size_pct,
            stop_pct,
            tp_pct,
            cooldown,
            allow_short,
            prices: Vec::new(),
            stance: Stance::Flat,
            entry_price: None,
            cool: 0,
        }
    }

    fn zscore(&self, price: f64) -> f64 {
        let tail = &self.prices[self.prices.len() - self.window..];
        let n = tail.len() as f64;
        let mean = tail.iter().sum::<f64>() / n;
        let variance = tail.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        let sigma = variance.sqrt().max(1e-12);
        (price - mean) / sigma
    }

    fn exit_order(&mut self, ts: NaiveDateTime, tag: &str) -> Result<Order, BarsimError> {
        let side = if self.stance == Stance::Long {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        };
        self.stance = Stance::Flat;
        self.entry_price = None;
        if self.cooldown > 0 {
            self.cool = self.cooldown;
        }
        Order::market(format!("{ts}-{tag}"), ts, side, Quantity::Close)
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("window".into(), self.window.to_string()),
            ("entry_z".into(), self.entry_z.to_string()),
            ("exit_z".into(), self.exit_z.to_string()),
            ("size_pct".into(), self.size_pct.to_string()),
            (
                "stop_pct".into(),
                self.stop_pct.map_or("none".into(), |v| v.to_string()),
            ),
            (
                "tp_pct".into(),
                self.tp_pct.map_or("none".into(), |v| v.to_string()),
            ),
            ("cooldown".into(), self.cooldown.to_string()),
            ("allow_short".into(), self.allow_short.to_string()),
        ]
    }

    fn reset(&mut self) {
        self.prices = Vec::new();
        self.stance = Stance::Flat;
        self.entry_price = None;
        self.cool = 0;
    }

    fn on_bar(&mut self, ts: NaiveDateTime, bar: &Bar) -> Result<Vec<Order>, BarsimError> {
        let price = bar.close;
        self.prices.push(price);
        let mut orders = Vec::new();
        if self.prices.len() < self.window {
            return Ok(orders);
        }
        let z = self.zscore(price);

        if self.cool > 0 {
            self.cool -= 1;
            return Ok(orders);
        }

        // exits take priority over new entries
        if self.stance != Stance::Flat {
            if z.abs() < self.exit_z {
                orders.push(self.exit_order(ts, "exit")?);
                return Ok(orders);
            }
            if let (Some(stop), Some(entry)) = (self.stop_pct, self.entry_price) {
                let stopped = match self.stance {
                    Stance::Long => price <= entry * (1.0 - stop),
                    Stance::Short => price >= entry * (1.0 + stop),
                    Stance::Flat => false,
                };
                if stopped {
                    orders.push(self.exit_order(ts, "sl")?);
                    return Ok(orders);
                }
            }
            if let (Some(tp), Some(entry)) = (self.tp_pct, self.entry_price) {
                let taken = match self.stance {
                    Stance::Long => price >= entry * (1.0 + tp),
                    Stance::Short => price <= entry * (1.0 - tp),
                    Stance::Flat => false,
                };
                if taken {
                    orders.push(self.exit_order(ts, "tp")?);
                    return Ok(orders);
                }
            }
        }

        if z < -self.entry_z && self.stance != Stance::Long {
            if self.stance == Stance::Short {
                orders.push(Order::market(
                    format!("{ts}-close"),
                    ts,
                    OrderSide::Buy,
                    Quantity::Close,
                )?);
            }
            orders.push(Order::market(
                format!("{ts}-buy"),
                ts,
                OrderSide::Buy,
                Quantity::PctEquity(self.size_pct),
            )?);
            self.stance = Stance::Long;
            self.entry_price = Some(price);
        } else if self.allow_short && z > self.entry_z && self.stance != Stance::Short {
            if self.stance == Stance::Long {
                orders.push(Order::market(
                    format!("{ts}-close"),
                    ts,
                    OrderSide::Sell,
                    Quantity::Close,
                )?);
            }
            orders.push(Order::market(
                format!("{ts}-sell"),
                ts,
                OrderSide::Sell,
                Quantity::PctEquity(self.size_pct),
            )?);
            self.stance = Stance::Short;
            self.entry_price = Some(price);
        }
        Ok(orders)
    }
}
