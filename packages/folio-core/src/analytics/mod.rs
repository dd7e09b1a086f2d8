//! Performance analytics module.
//!
//! Provides daily PnL series metrics and value-curve returns.

mod returns;
mod series;

pub use returns::{holding_period_return, time_weighted_return, value_changes};
pub use series::{analyze, max_drawdown, sharpe_ratio, CumulativePoint, PerformanceMetrics};

use crate::{Error, Result};
use chrono::NaiveDate;

/// Reject any date that does not come strictly after its predecessor.
pub(crate) fn ensure_ascending<I>(dates: I) -> Result<()>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut previous: Option<NaiveDate> = None;
    for (index, date) in dates.into_iter().enumerate() {
        if let Some(prev) = previous {
            if date <= prev {
                tracing::warn!(index, %date, %prev, "series is not in date order");
                return Err(Error::UnorderedSeries { index });
            }
        }
        previous = Some(date);
    }
    Ok(())
}
