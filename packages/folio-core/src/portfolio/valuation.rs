//! Per-position valuation.

use crate::types::Position;
use crate::{Error, Result};
use serde::Serialize;

/// P/L figures for one position.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    /// Position this valuation belongs to
    pub position_id: u64,
    /// `amount * (current_price - entry_price)`
    pub pnl: f64,
    /// Return on entry price in percent, absent when the entry price is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pnl_percentage: Option<f64>,
    /// `amount * current_price / entry_price`, absent when the entry price is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    market_value: Option<f64>,
}

impl PositionValuation {
    /// Return percentage, or [`Error::DivisionByZero`] for a zero entry price.
    pub fn pnl_percentage(&self) -> Result<f64> {
        self.pnl_percentage.ok_or_else(|| self.zero_entry())
    }

    /// Mark-to-market value of the committed capital.
    pub fn market_value(&self) -> Result<f64> {
        self.market_value.ok_or_else(|| self.zero_entry())
    }

    fn zero_entry(&self) -> Error {
        Error::DivisionByZero(format!(
            "position {} has a zero entry price",
            self.position_id
        ))
    }
}

/// Value a single position.
pub fn valuate(position: &Position) -> PositionValuation {
    let pnl_percentage = position.pnl_percentage().ok();
    let market_value = if position.entry_price == 0.0 {
        None
    } else {
        Some(position.amount * position.current_price / position.entry_price)
    };

    PositionValuation {
        position_id: position.id,
        pnl: position.pnl(),
        pnl_percentage,
        market_value,
    }
}
