//! Order and fill value types, plus quantity resolution.

use chrono::NaiveDateTime;

use super::error::BarsimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
}

/// Quantity specification, decided at order construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    /// Absolute share count, must be positive.
    Shares(f64),
    /// Invest this fraction of current equity, floored to whole shares.
    PctEquity(f64),
    /// Fully unwind the current position; side must oppose it.
    Close,
}

/// A trading intent emitted by a strategy, consumed once by the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub ts: NaiveDateTime,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub order_type: OrderType,
    pub limit_price: Option<f64>,
}

impl Order {
    /// Construct a market order, validating the quantity spec.
    pub fn market(
        id: impl Into<String>,
        ts: NaiveDateTime,
        side: OrderSide,
        quantity: Quantity,
    ) -> Result<Self, BarsimError> {
        validate_quantity(&quantity)?;
        Ok(Self {
            id: id.into(),
            ts,
            side,
            quantity,
            order_type: OrderType::Market,
            limit_price: None,
        })
    }

    /// Construct a limit order. The limit price is required and must be a
    /// finite positive number.
    pub fn limit(
        id: impl Into<String>,
        ts: NaiveDateTime,
        side: OrderSide,
        quantity: Quantity,
        limit_price: f64,
    ) -> Result<Self, BarsimError> {
        validate_quantity(&quantity)?;
        if !limit_price.is_finite() || limit_price <= 0.0 {
            return Err(BarsimError::InvalidOrder {
                reason: "limit_price must be a finite positive number".into(),
            });
        }
        Ok(Self {
            id: id.into(),
            ts,
            side,
            quantity,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
        })
    }
}

fn validate_quantity(quantity: &Quantity) -> Result<(), BarsimError> {
    match *quantity {
        Quantity::Shares(q) if !q.is_finite() || q <= 0.0 => Err(BarsimError::InvalidOrder {
            reason: "share quantity must be a finite positive number".into(),
        }),
        Quantity::PctEquity(f) if !f.is_finite() || f <= 0.0 => Err(BarsimError::InvalidOrder {
            reason: "equity fraction must be a finite positive number".into(),
        }),
        _ => Ok(()),
    }
}

/// The realized outcome of executing an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub order_id: String,
    pub ts: NaiveDateTime,
    /// Execution price after slippage.
    pub price: f64,
    pub qty: f64,
    pub commission: f64,
}

/// Resolve a quantity specification to a non-negative absolute share count.
///
/// `equity` is the mark-to-market equity immediately prior to execution.
pub fn resolve_quantity(
    quantity: &Quantity,
    equity: f64,
    price: f64,
    current_position: f64,
) -> f64 {
    match *quantity {
        Quantity::Shares(q) => q,
        Quantity::Close => {
            if current_position == 0.0 {
                0.0
            } else {
                current_position.abs()
            }
        }
        Quantity::PctEquity(fraction) => {
            let notional = equity * fraction;
            (notional / price).floor().max(0.0)
        }
    }
}
