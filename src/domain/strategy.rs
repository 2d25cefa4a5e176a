//! The bar-driven strategy contract.

use chrono::NaiveDateTime;

use super::bar::Bar;
use super::error::BarsimError;
use super::order::Order;

/// Direction a strategy believes itself to hold, tracked internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stance {
    #[default]
    Flat,
    Long,
    Short,
}

/// A bar-driven decision function producing zero or more orders.
///
/// `reset` must be called exactly once before a run begins and re-initializes
/// all internal state, so an instance is reusable across independent runs.
/// `on_bar` is called once per bar in feed order; it must be a pure function
/// of the bar stream seen so far plus internal state, and the returned order
/// sequence sets the intra-bar execution order. Errors propagate to the
/// engine and abort the run.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Parameter set for reporting, as display pairs.
    fn params(&self) -> Vec<(String, String)>;

    fn reset(&mut self);

    fn on_bar(&mut self, ts: NaiveDateTime, bar: &Bar) -> Result<Vec<Order>, BarsimError>;
}

impl<T: Strategy + ?Sized> Strategy for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn params(&self) -> Vec<(String, String)> {
        (**self).params()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn on_bar(&mut self, ts: NaiveDateTime, bar: &Bar) -> Result<Vec<Order>, BarsimError> {
        (**self).on_bar(ts, bar)
    }
}
