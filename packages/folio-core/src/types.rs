//! Core data types for the analytics engine.
//!
//! All types serialize with camelCase field names so they line up with the
//! shapes the dashboard front end exchanges.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An open position in a market or asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Identifier, unique within its portfolio
    pub id: u64,
    /// Market question or asset name
    #[serde(default)]
    pub market: String,
    /// Outcome or side held (e.g. "Yes" / "No")
    #[serde(default, alias = "position")]
    pub outcome: String,
    /// Capital committed to the position
    pub amount: f64,
    /// Price paid per unit at entry
    pub entry_price: f64,
    /// Latest known price per unit
    pub current_price: f64,
    /// Strategy the position was opened under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<AllocationId>,
}

impl Position {
    /// Create a new position.
    pub fn new(
        id: u64,
        market: &str,
        outcome: &str,
        amount: f64,
        entry_price: f64,
        current_price: f64,
    ) -> Self {
        Self {
            id,
            market: market.to_string(),
            outcome: outcome.to_string(),
            amount,
            entry_price,
            current_price,
            strategy_id: None,
        }
    }

    /// Tag the position with the strategy that opened it.
    pub fn with_strategy(mut self, strategy_id: impl Into<AllocationId>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }

    /// Copy of the position marked at a new price.
    pub fn with_price(&self, current_price: f64) -> Self {
        Self {
            current_price,
            ..self.clone()
        }
    }

    /// Profit or loss: `amount * (current_price - entry_price)`.
    pub fn pnl(&self) -> f64 {
        self.amount * (self.current_price - self.entry_price)
    }

    /// Price change relative to entry, in percent.
    ///
    /// Fails with [`Error::DivisionByZero`] when the entry price is zero.
    pub fn pnl_percentage(&self) -> Result<f64> {
        if self.entry_price == 0.0 {
            return Err(Error::DivisionByZero(format!(
                "position {} has a zero entry price",
                self.id
            )));
        }
        Ok((self.current_price - self.entry_price) / self.entry_price * 100.0)
    }
}

/// Identifier of an allocation entry: a strategy id or a holding name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllocationId {
    Number(u64),
    Name(String),
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationId::Number(n) => write!(f, "{}", n),
            AllocationId::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for AllocationId {
    fn from(id: u64) -> Self {
        AllocationId::Number(id)
    }
}

impl From<&str> for AllocationId {
    fn from(name: &str) -> Self {
        AllocationId::Name(name.to_string())
    }
}

impl From<String> for AllocationId {
    fn from(name: String) -> Self {
        AllocationId::Name(name)
    }
}

/// A named percentage share of a portfolio or strategy mix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub id: AllocationId,
    /// Display name of the strategy or holding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Share in percent, expected in [0, 100]
    #[serde(alias = "allocation")]
    pub percentage: f64,
}

impl Allocation {
    /// Create an unnamed allocation entry.
    pub fn new(id: impl Into<AllocationId>, percentage: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            percentage,
        }
    }

    /// Attach a display name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Realized profit or loss for one calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerformanceSample {
    pub date: NaiveDate,
    pub pnl: f64,
}

impl PerformanceSample {
    pub fn new(date: NaiveDate, pnl: f64) -> Self {
        Self { date, pnl }
    }
}

/// Portfolio value observed on a date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ValuePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A categorized value to be broken down into shares of a total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionItem {
    /// Category, strategy, or holding class
    #[serde(alias = "name")]
    pub category: String,
    pub value: f64,
}

impl CompositionItem {
    pub fn new(category: &str, value: f64) -> Self {
        Self {
            category: category.to_string(),
            value,
        }
    }
}

/// A category's share of a composition total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionShare {
    pub category: String,
    pub value: f64,
    /// Share of the total in percent, full precision
    pub percentage: f64,
}

/// Response envelope used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
