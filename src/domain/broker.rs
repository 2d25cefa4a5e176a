//! Fill simulation: slippage and commission applied to resolved orders.

use chrono::NaiveDateTime;

use super::order::{resolve_quantity, Fill, Order, OrderSide};

/// Translates an order plus market state into a fill.
///
/// Pure function of its inputs and the two configured rates; performs no
/// ledger mutation. The reference broker applies market semantics to every
/// order; limit orders are accepted by the contract as an extension point.
#[derive(Debug, Clone, PartialEq)]
pub struct Broker {
    pub slippage_bps: f64,
    pub commission_bps: f64,
}

impl Default for Broker {
    fn default() -> Self {
        Broker {
            slippage_bps: 1.0,
            commission_bps: 0.0,
        }
    }
}

impl Broker {
    pub fn new(slippage_bps: f64, commission_bps: f64) -> Self {
        Broker {
            slippage_bps,
            commission_bps,
        }
    }

    /// Execute `order` at the given market price. Returns `None` when the
    /// quantity resolves to zero (the order has no effect; not an error).
    ///
    /// Slippage always moves the fill price against the trader: buys fill
    /// above the market price, sells below.
    pub fn execute(
        &self,
        order: &Order,
        price: f64,
        ts: NaiveDateTime,
        equity: f64,
        current_position: f64,
    ) -> Option<Fill> {
        let shares = resolve_quantity(&order.quantity, equity, price, current_position);
        if shares <= 0.0 {
            return None;
        }
        let slip = price * (self.slippage_bps / 10_000.0);
        let fill_price = match order.side {
            OrderSide::Buy => price + slip,
            OrderSide::Sell => price - slip,
        };
        let commission = fill_price * shares * (self.commission_bps / 10_000.0);
        Some(Fill {
            order_id: order.id.clone(),
            ts,
            price: fill_price,
            qty: shares,
            commission,
        })
    }
}
