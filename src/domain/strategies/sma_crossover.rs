//! Fast/slow moving-average crossover strategy.

use chrono::NaiveDateTime;

use crate::domain::bar::Bar;
use crate::domain::error::BarsimError;
use crate::domain::order::{Order, OrderSide, Quantity};
use crate::domain::strategy::{Stance, Strategy};

/// Goes long when the fast average crosses above the slow one; optionally
/// shorts on the opposite cross. Direction changes close the open position
/// first, then reopen within the same bar.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    pub fast: usize,
    pub slow: usize,
    pub size_pct: f64,
    pub cooldown: usize,
    pub long_only: bool,

    prices: Vec<f64>,
    cool: usize,
    stance: Stance,
}

impl SmaCrossover {
    pub fn new(fast: usize, slow: usize, size_pct: f64, cooldown: usize, long_only: bool) -> Self {
        SmaCrossover {
            fast,
            slow,
            size_pct,
            cooldown,
            long_only,
            prices: Vec::new(),
            cool: 0,
            stance: Stance::Flat,
        }
    }

    fn sma(&self, window: usize) -> f64 {
        let tail = &self.prices[self.prices.len() - window..];
        tail.iter().sum::<f64>() / window as f64
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("fast".into(), self.fast.to_string()),
            ("slow".into(), self.slow.to_string()),
            ("size_pct".into(), self.size_pct.to_string()),
            ("cooldown".into(), self.cooldown.to_string()),
            ("long_only".into(), self.long_only.to_string()),
        ]
    }

    fn reset(&mut self) {
        self.prices = Vec::new();
        self.cool = 0;
        self.stance = Stance::Flat;
    }

    fn on_bar(&mut self, ts: NaiveDateTime, bar: &Bar) -> Result<Vec<Order>, BarsimError> {
        self.prices.push(bar.close);
        let mut orders = Vec::new();
        if self.prices.len() < self.fast.max(self.slow) {
            return Ok(orders);
        }
        let fast_sma = self.sma(self.fast);
        let slow_sma = self.sma(self.slow);

        if self.cool > 0 {
            self.cool -= 1;
            return Ok(orders);
        }

        if fast_sma > slow_sma && self.stance != Stance::Long {
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
        } else if fast_sma < slow_sma && !self.long_only && self.stance != Stance::Short {
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
        } else if (fast_sma <= slow_sma && self.stance == Stance::Long)
            || (fast_sma >= slow_sma && self.stance == Stance::Short)
        {
            let side = if self.stance == Stance::Long {
                OrderSide::Sell
            } else {
                OrderSide::Buy
            };
            orders.push(Order::market(
                format!("{ts}-exit"),
                ts,
                side,
                Quantity::Close,
            )?);
            self.stance = Stance::Flat;
            if self.cooldown > 0 {
                self.cool = self.cooldown;
            }
        }
        Ok(orders)
    }
}
