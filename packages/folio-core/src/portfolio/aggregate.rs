//! Portfolio-level totals and per-strategy subtotals.

use crate::types::Position;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Portfolio totals derived from its open positions.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Sum of committed capital (cost basis)
    pub total_value: f64,
    /// Sum of position P/L
    pub total_pnl: f64,
    /// `total_pnl / total_value * 100`, absent for an empty portfolio
    #[serde(skip_serializing_if = "Option::is_none")]
    pnl_percentage: Option<f64>,
    /// Number of open positions
    pub count: usize,
    /// Number of positions with gains
    pub positions_in_profit: usize,
    /// Number of positions with losses
    pub positions_in_loss: usize,
}

impl PortfolioSummary {
    /// Portfolio return in percent, or [`Error::DivisionByZero`] when the
    /// committed capital totals zero.
    pub fn pnl_percentage(&self) -> Result<f64> {
        self.pnl_percentage.ok_or_else(|| {
            Error::DivisionByZero("portfolio has no committed capital".to_string())
        })
    }
}

/// Sum position figures into portfolio totals.
///
/// `total_value` is the committed capital, not a mark-to-market value; see
/// [`crate::PositionValuation::market_value`] for the latter.
pub fn aggregate(positions: &[Position]) -> PortfolioSummary {
    let total_value: f64 = positions.iter().map(|p| p.amount).sum();
    let total_pnl: f64 = positions.iter().map(Position::pnl).sum();

    let pnl_percentage = if total_value == 0.0 {
        None
    } else {
        Some(total_pnl / total_value * 100.0)
    };

    let positions_in_profit = positions.iter().filter(|p| p.pnl() > 0.0).count();
    let positions_in_loss = positions.iter().filter(|p| p.pnl() < 0.0).count();

    tracing::debug!(
        count = positions.len(),
        total_value,
        total_pnl,
        "aggregated portfolio"
    );

    PortfolioSummary {
        total_value,
        total_pnl,
        pnl_percentage,
        count: positions.len(),
        positions_in_profit,
        positions_in_loss,
    }
}

/// Positions belonging to one strategy, summed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategySubtotal<K> {
    pub strategy: K,
    /// Committed capital
    pub amount: f64,
    pub pnl: f64,
    pub position_count: usize,
}

impl<K> StrategySubtotal<K> {
    /// Strategy return in percent.
    pub fn pnl_percentage(&self) -> Result<f64> {
        if self.amount == 0.0 {
            return Err(Error::DivisionByZero(
                "strategy has no committed capital".to_string(),
            ));
        }
        Ok(self.pnl / self.amount * 100.0)
    }
}

/// Group positions by strategy.
///
/// Subtotals appear in the order each strategy is first seen; strategies
/// with no positions are not emitted.
pub fn group_by_strategy<K, F>(positions: &[Position], strategy_of: F) -> Vec<StrategySubtotal<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&Position) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut subtotals: Vec<StrategySubtotal<K>> = Vec::new();

    for position in positions {
        let key = strategy_of(position);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), subtotals.len());
                subtotals.push(StrategySubtotal {
                    strategy: key,
                    amount: 0.0,
                    pnl: 0.0,
                    position_count: 0,
                });
                subtotals.len() - 1
            }
        };

        let subtotal = &mut subtotals[slot];
        subtotal.amount += position.amount;
        subtotal.pnl += position.pnl();
        subtotal.position_count += 1;
    }

    subtotals
}
