//! The portfolio entity: open positions plus a strategy mix.

use super::aggregate::{aggregate, group_by_strategy, PortfolioSummary, StrategySubtotal};
use super::valuation::{valuate, PositionValuation};
use crate::allocation::{self, AllocationCheck};
use crate::feed::PriceFeed;
use crate::types::{Allocation, AllocationId, Position, ValuePoint};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A portfolio owning its open positions and strategy allocations.
///
/// Positions are unique by id. Closing a position removes it from the
/// active set; nothing else deletes positions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDate>,
    #[serde(default)]
    positions: Vec<Position>,
    /// Strategy mix
    #[serde(default, alias = "strategies")]
    pub allocations: Vec<Allocation>,
    /// Historical value curve, date ascending
    #[serde(
        default,
        alias = "historicalPerformance",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub history: Vec<ValuePoint>,
}

impl Portfolio {
    /// Create an empty portfolio.
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_allocations(mut self, allocations: Vec<Allocation>) -> Self {
        self.allocations = allocations;
        self
    }

    /// Get all open positions.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Find a position by id.
    pub fn find_position(&self, id: u64) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    /// Record a newly opened position.
    pub fn open_position(&mut self, position: Position) -> Result<()> {
        if self.find_position(position.id).is_some() {
            return Err(Error::DuplicatePositionId(position.id));
        }
        self.positions.push(position);
        Ok(())
    }

    /// Close a position, removing it from the active set.
    ///
    /// Returns the closed position if found.
    pub fn close_position(&mut self, id: u64) -> Result<Position> {
        if let Some(idx) = self.positions.iter().position(|p| p.id == id) {
            Ok(self.positions.remove(idx))
        } else {
            Err(Error::PositionNotFound(id))
        }
    }

    /// Mark every quoted position at its latest feed price.
    ///
    /// Returns the number of positions updated. Non-finite or negative quotes
    /// are ignored.
    pub fn reprice(&mut self, feed: &dyn PriceFeed) -> usize {
        let mut updated = 0;
        for position in &mut self.positions {
            match feed.price(position) {
                Some(price) if price.is_finite() && price >= 0.0 => {
                    position.current_price = price;
                    updated += 1;
                }
                Some(price) => {
                    tracing::warn!(position = position.id, price, "ignoring invalid quote");
                }
                None => {}
            }
        }
        tracing::debug!(portfolio = self.id, updated, "repriced positions");
        updated
    }

    /// Check that position ids are unique.
    ///
    /// Deserialized portfolios bypass [`Portfolio::open_position`], so loaders
    /// call this before handing the portfolio out.
    pub fn check_positions(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.positions.len());
        for position in &self.positions {
            if !seen.insert(position.id) {
                return Err(Error::DuplicatePositionId(position.id));
            }
        }
        Ok(())
    }

    /// Portfolio totals.
    pub fn summary(&self) -> PortfolioSummary {
        aggregate(&self.positions)
    }

    /// Valuation of every open position, in position order.
    pub fn valuations(&self) -> Vec<PositionValuation> {
        self.positions.iter().map(valuate).collect()
    }

    pub fn total_value(&self) -> f64 {
        self.summary().total_value
    }

    pub fn total_pnl(&self) -> f64 {
        self.summary().total_pnl
    }

    pub fn pnl_percentage(&self) -> Result<f64> {
        self.summary().pnl_percentage()
    }

    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of strategies in the mix.
    pub fn strategy_count(&self) -> usize {
        self.allocations.len()
    }

    /// Validate the strategy mix.
    pub fn allocation_check(&self, tolerance: f64) -> Result<AllocationCheck> {
        allocation::validate_with_tolerance(&self.allocations, tolerance)
    }

    /// Subtotals per strategy; positions without a strategy group under `None`.
    pub fn strategy_breakdown(&self) -> Vec<StrategySubtotal<Option<AllocationId>>> {
        group_by_strategy(&self.positions, |p| p.strategy_id.clone())
    }
}
