//! Position-sizing helpers: volatility targeting, Kelly, hard caps.
//!
//! Pure functions over return series and win/loss statistics; strategies can
//! feed the results into [`Quantity::PctEquity`](super::order::Quantity)
//! orders. Degenerate inputs resolve to 0.0, never errors.

use super::metrics::{population_std, Frequency};

/// Scale factor that brings a position's annualized volatility to
/// `target_ann_vol`. Empty or flat return series scale to 0.
pub fn target_position_scale(returns: &[f64], freq: Frequency, target_ann_vol: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let vol = population_std(returns) * freq.annualization_factor().sqrt();
    if !(vol > 0.0) {
        return 0.0;
    }
    target_ann_vol / vol
}

/// Kelly fraction under the simple Bernoulli assumption,
/// `f* = p - (1 - p) / b` where `b` is the win/loss ratio.
///
/// Out-of-range inputs yield 0; the result is clamped to [0, 1].
pub fn kelly_fraction(win_prob: f64, win_loss_ratio: f64) -> f64 {
    if !(win_prob > 0.0 && win_prob < 1.0) || !(win_loss_ratio > 0.0) {
        return 0.0;
    }
    let frac = win_prob - (1.0 - win_prob) / win_loss_ratio;
    frac.clamp(0.0, 1.0)
}

/// Clamp a signed position fraction to `[-max_abs_fraction, max_abs_fraction]`.
/// A non-positive cap forces the fraction to 0.
pub fn cap_position_fraction(fraction: f64, max_abs_fraction: f64) -> f64 {
    if !(max_abs_fraction > 0.0) {
        return 0.0;
    }
    fraction.clamp(-max_abs_fraction, max_abs_fraction)
}
