//! OHLCV bar representation and the validated bar feed.

use chrono::NaiveDateTime;

use super::error::BarsimError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub ts: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
    }
}

/// An ordered, finite sequence of bars ready for simulation.
///
/// Construction validates the whole feed up front: every numeric field must
/// be finite and non-negative, and timestamps must be strictly increasing.
/// Feed exhaustion is the engine's sole termination signal.
#[derive(Debug, Clone)]
pub struct BarFeed {
    bars: Vec<Bar>,
}

impl BarFeed {
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarsimError> {
        for (i, bar) in bars.iter().enumerate() {
            for (name, value) in bar.fields() {
                if !value.is_finite() || value < 0.0 {
                    return Err(BarsimError::Feed {
                        reason: format!("bar {} ({}): {} must be finite and non-negative", i, bar.ts, name),
                    });
                }
            }
            if i > 0 && bar.ts <= bars[i - 1].ts {
                return Err(BarsimError::Feed {
                    reason: format!(
                        "timestamps must be strictly increasing: {} follows {}",
                        bar.ts,
                        bars[i - 1].ts
                    ),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
