//! Backtest engine and event loop.

use chrono::NaiveDateTime;

use super::bar::BarFeed;
use super::broker::Broker;
use super::error::BarsimError;
use super::order::Fill;
use super::portfolio::Portfolio;
use super::strategy::Strategy;

/// One history record per processed bar, appended whether or not a trade
/// occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub ts: NaiveDateTime,
    pub price: f64,
    pub position: f64,
    pub cash: f64,
    pub equity: f64,
    pub drawdown: f64,
}

/// Output of a completed run: the per-bar history, the append-only fill
/// log, and the final portfolio state.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub history: Vec<Snapshot>,
    pub fills: Vec<Fill>,
    pub portfolio: Portfolio,
}

/// Drives a single complete traversal of the feed: not started → running →
/// completed, with no pausing or retries. Any error from the strategy
/// propagates and aborts the run.
#[derive(Debug)]
pub struct Engine<S: Strategy> {
    feed: BarFeed,
    broker: Broker,
    strategy: S,
    initial_cash: f64,
}

impl<S: Strategy> Engine<S> {
    pub fn new(feed: BarFeed, broker: Broker, strategy: S, initial_cash: f64) -> Self {
        Engine {
            feed,
            broker,
            strategy,
            initial_cash,
        }
    }

    /// Run the simulation to feed exhaustion.
    ///
    /// Per bar: mark to market at the close, collect the strategy's orders,
    /// execute each in emission order, and re-mark after every fill so a
    /// later order in the same bar sizes against the earlier order's
    /// effect. One snapshot is appended per bar.
    pub fn run(mut self) -> Result<BacktestResult, BarsimError> {
        let mut portfolio = Portfolio::new(self.initial_cash);
        self.strategy.reset();

        let mut history: Vec<Snapshot> = Vec::with_capacity(self.feed.len());
        let mut fills: Vec<Fill> = Vec::new();
        let mut running_max = f64::NEG_INFINITY;

        for bar in self.feed.bars() {
            let price = bar.close;
            portfolio.mark_to_market(price);

            let orders = self.strategy.on_bar(bar.ts, bar)?;
            for order in orders {
                // equity for sizing reflects every prior fill on this bar
                let equity = (portfolio.cash + portfolio.position * price).max(0.0);
                let Some(fill) =
                    self.broker
                        .execute(&order, price, bar.ts, equity, portfolio.position)
                else {
                    continue;
                };
                fills.push(fill.clone());
                portfolio.apply_trade(order.side, &fill);
                portfolio.mark_to_market(price);
            }

            let equity = portfolio.cash + portfolio.position * price;
            running_max = running_max.max(equity);
            let drawdown = if running_max == 0.0 {
                0.0
            } else {
                (equity - running_max) / running_max
            };

            history.push(Snapshot {
                ts: bar.ts,
                price,
                position: portfolio.position,
                cash: portfolio.cash,
                equity,
                drawdown,
            });
        }

        Ok(BacktestResult {
            history,
            fills,
            portfolio,
        })
    }
}
