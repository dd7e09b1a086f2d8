//! Returns over a portfolio value curve.

use super::ensure_ascending;
use crate::types::{PerformanceSample, ValuePoint};
use crate::{Error, Result};

/// Calculate holding period return in percent.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> Result<f64> {
    if initial_value <= 0.0 {
        return Err(Error::DivisionByZero(format!(
            "initial value {} is not positive",
            initial_value
        )));
    }
    Ok((final_value - initial_value) / initial_value * 100.0)
}

/// Time-weighted return in percent for a date-ascending value curve.
///
/// Chains the growth factor of every period. Needs at least two points, and
/// every value before the last must be positive.
pub fn time_weighted_return(points: &[ValuePoint]) -> Result<f64> {
    if points.len() < 2 {
        return Err(Error::InsufficientData(
            "need at least 2 values for a time-weighted return".to_string(),
        ));
    }
    ensure_ascending(points.iter().map(|p| p.date))?;

    let mut twr = 1.0;
    for pair in points.windows(2) {
        if pair[0].value <= 0.0 {
            return Err(Error::DivisionByZero(format!(
                "value on {} is not positive",
                pair[0].date
            )));
        }
        twr *= pair[1].value / pair[0].value;
    }

    Ok((twr - 1.0) * 100.0)
}

/// Convert a value curve into per-period PnL samples.
///
/// Each sample is dated at the end of its period, so `n` points yield
/// `n - 1` samples.
pub fn value_changes(points: &[ValuePoint]) -> Result<Vec<PerformanceSample>> {
    ensure_ascending(points.iter().map(|p| p.date))?;
    Ok(points
        .windows(2)
        .map(|pair| PerformanceSample::new(pair[1].date, pair[1].value - pair[0].value))
        .collect())
}
