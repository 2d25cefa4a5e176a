//! Portfolio ledger: cash, position, average cost, realized P&L.

use super::order::{Fill, OrderSide};

/// The single mutable ledger of a run, owned and driven by the engine
/// through [`Portfolio::apply_trade`] and [`Portfolio::mark_to_market`].
///
/// Cash may go negative; no margin is enforced. `avg_cost` is meaningful
/// only while `position != 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub position: f64,
    pub avg_cost: f64,
    pub equity: f64,
    pub realized_pnl: f64,
    pub trade_log: Vec<Fill>,
}

impl Portfolio {
    pub fn new(cash: f64) -> Self {
        Portfolio {
            cash,
            position: 0.0,
            avg_cost: 0.0,
            equity: cash,
            realized_pnl: 0.0,
            trade_log: Vec::new(),
        }
    }

    pub fn is_long(&self) -> bool {
        self.position > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.position < 0.0
    }

    /// Apply a fill to the ledger.
    ///
    /// Cash moves by the signed notional and the commission. The position
    /// cases are mutually exclusive:
    /// - opening (flat): `avg_cost` becomes the fill price;
    /// - adding (same sign): `avg_cost` becomes the volume-weighted average;
    /// - reducing or flipping (opposite signs): P&L is realized on the
    ///   closing portion against the old `avg_cost`, net of commission.
    ///   When the trade flips the direction, the remainder opens a fresh
    ///   position and `avg_cost` is reset to the fill price.
    pub fn apply_trade(&mut self, side: OrderSide, fill: &Fill) {
        let qty_signed = match side {
            OrderSide::Buy => fill.qty,
            OrderSide::Sell => -fill.qty,
        };
        let notional = fill.price * fill.qty;
        match side {
            OrderSide::Buy => self.cash -= notional,
            OrderSide::Sell => self.cash += notional,
        }
        self.cash -= fill.commission;

        let new_position = self.position + qty_signed;
        if self.position == 0.0 && qty_signed != 0.0 {
            self.avg_cost = fill.price;
        } else if (self.position > 0.0 && qty_signed > 0.0)
            || (self.position < 0.0 && qty_signed < 0.0)
        {
            let total_shares = self.position.abs() + qty_signed.abs();
            if total_shares != 0.0 {
                self.avg_cost = (self.position.abs() * self.avg_cost
                    + qty_signed.abs() * fill.price)
                    / total_shares;
            }
        } else {
            let closing_qty = self.position.abs().min(qty_signed.abs());
            let pnl_per_share = if self.position > 0.0 {
                fill.price - self.avg_cost
            } else {
                self.avg_cost - fill.price
            };
            self.realized_pnl += closing_qty * pnl_per_share - fill.commission;
            if qty_signed.abs() > self.position.abs() {
                // flip: the excess opens a new position at the fill price
                self.avg_cost = fill.price;
            }
        }

        self.position = new_position;
        self.trade_log.push(fill.clone());
    }

    /// Recompute equity at the given price: `equity = cash + position * price`.
    pub fn mark_to_market(&mut self, price: f64) {
        self.equity = self.cash + self.position * price;
    }

    /// Fractional decline of each equity value from its running maximum.
    /// The degenerate zero running-max case maps to 0.
    pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
        let mut running_max = f64::NEG_INFINITY;
        equity
            .iter()
            .map(|&e| {
                running_max = running_max.max(e);
                if running_max == 0.0 {
                    0.0
                } else {
                    (e - running_max) / running_max
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn fill(price: f64, qty: f64, commission: f64) -> Fill {
        Fill {
            order_id: "t".into(),
            ts: ts(),
            price,
            qty,
            commission,
        }
    }

    #[test]
    fn new_portfolio_is_flat() {
        let p = Portfolio::new(10_000.0);
        assert_eq!(p.cash, 10_000.0);
        assert_eq!(p.position, 0.0);
        assert_eq!(p.equity, 10_000.0);
        assert_eq!(p.realized_pnl, 0.0);
        assert!(p.trade_log.is_empty());
        assert!(!p.is_long());
        assert!(!p.is_short());
    }

    #[test]
    fn buy_opens_long_at_fill_price() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        p.mark_to_market(100.0);
        assert_eq!(p.position, 10.0);
        assert_eq!(p.cash, 9_000.0);
        assert_eq!(p.avg_cost, 100.0);
        assert_eq!(p.equity, 10_000.0);
        assert!(p.is_long());
    }

    #[test]
    fn sell_opens_short() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Sell, &fill(100.0, 5.0, 0.0));
        p.mark_to_market(100.0);
        assert_eq!(p.position, -5.0);
        assert_eq!(p.cash, 10_500.0);
        assert_eq!(p.avg_cost, 100.0);
        assert!(p.is_short());
    }

    #[test]
    fn adding_updates_volume_weighted_avg_cost() {
        let mut p = Portfolio::new(100_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        p.apply_trade(OrderSide::Buy, &fill(110.0, 30.0, 0.0));
        assert_eq!(p.position, 40.0);
        // (10*100 + 30*110) / 40 = 107.5
        assert!((p.avg_cost - 107.5).abs() < 1e-12);
        assert_eq!(p.realized_pnl, 0.0);
    }

    #[test]
    fn commission_deducted_on_both_sides() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 2.0));
        assert_eq!(p.cash, 10_000.0 - 1_000.0 - 2.0);
        p.apply_trade(OrderSide::Sell, &fill(100.0, 10.0, 2.0));
        assert_eq!(p.cash, 10_000.0 - 4.0);
    }

    #[test]
    fn round_trip_realizes_price_difference() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        p.apply_trade(OrderSide::Sell, &fill(110.0, 10.0, 0.0));
        p.mark_to_market(110.0);
        assert_eq!(p.position, 0.0);
        assert!((p.realized_pnl - 100.0).abs() < 1e-9);
        assert!((p.cash - 10_100.0).abs() < 1e-9);
    }

    #[test]
    fn closing_sell_commission_reduces_realized_pnl() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        p.apply_trade(OrderSide::Sell, &fill(110.0, 10.0, 1.0));
        assert!((p.realized_pnl - 99.0).abs() < 1e-9);
    }

    #[test]
    fn short_round_trip_profits_from_decline() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Sell, &fill(100.0, 10.0, 0.0));
        p.apply_trade(OrderSide::Buy, &fill(90.0, 10.0, 0.0));
        assert_eq!(p.position, 0.0);
        assert!((p.realized_pnl - 100.0).abs() < 1e-9);
    }

    #[test]
    fn partial_reduction_keeps_avg_cost() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        p.apply_trade(OrderSide::Sell, &fill(105.0, 4.0, 0.0));
        assert_eq!(p.position, 6.0);
        assert_eq!(p.avg_cost, 100.0);
        assert!((p.realized_pnl - 20.0).abs() < 1e-9);
    }

    #[test]
    fn opening_never_touches_realized_pnl() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        assert_eq!(p.realized_pnl, 0.0);
        p.apply_trade(OrderSide::Buy, &fill(120.0, 5.0, 0.0));
        assert_eq!(p.realized_pnl, 0.0);
    }

    #[test]
    fn flip_realizes_closing_portion_and_resets_avg_cost() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        // sell 25 at 110: closes 10 long (+100 realized), opens 15 short
        p.apply_trade(OrderSide::Sell, &fill(110.0, 25.0, 0.0));
        assert_eq!(p.position, -15.0);
        assert!((p.realized_pnl - 100.0).abs() < 1e-9);
        // the short remainder is carried at the flip's fill price
        assert_eq!(p.avg_cost, 110.0);
    }

    #[test]
    fn equity_identity_after_mark() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        p.mark_to_market(110.0);
        assert_eq!(p.equity, p.cash + p.position * 110.0);
        assert!((p.equity - 10_100.0).abs() < 1e-9);
    }

    #[test]
    fn trade_log_is_append_only() {
        let mut p = Portfolio::new(10_000.0);
        p.apply_trade(OrderSide::Buy, &fill(100.0, 10.0, 0.0));
        p.apply_trade(OrderSide::Sell, &fill(110.0, 10.0, 0.0));
        assert_eq!(p.trade_log.len(), 2);
        assert_eq!(p.trade_log[0].price, 100.0);
        assert_eq!(p.trade_log[1].price, 110.0);
    }

    #[test]
    fn drawdown_zero_at_running_maxima() {
        let dd = Portfolio::drawdown_series(&[100.0, 110.0, 120.0]);
        assert_eq!(dd, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn drawdown_measures_decline_from_peak() {
        let dd = Portfolio::drawdown_series(&[100.0, 110.0, 99.0, 121.0]);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] - (99.0 - 110.0) / 110.0).abs() < 1e-12);
        assert_eq!(dd[3], 0.0);
    }

    #[test]
    fn drawdown_empty_series() {
        assert!(Portfolio::drawdown_series(&[]).is_empty());
    }

    #[test]
    fn drawdown_zero_running_max_maps_to_zero() {
        let dd = Portfolio::drawdown_series(&[0.0, 0.0]);
        assert_eq!(dd, vec![0.0, 0.0]);
    }
}
