//! Data supply capabilities.
//!
//! The analytics never fetch anything themselves. Prices and portfolios come
//! in through these traits, so a brokerage client, a fixture file, or a test
//! fake can stand behind them.

use crate::portfolio::Portfolio;
use crate::types::Position;
use crate::{Error, Result};
use std::collections::HashMap;

/// Source of current prices.
pub trait PriceFeed {
    /// Latest price for the position's market, if the feed quotes it.
    fn price(&self, position: &Position) -> Option<f64>;
}

impl<F> PriceFeed for F
where
    F: Fn(&Position) -> Option<f64>,
{
    fn price(&self, position: &Position) -> Option<f64> {
        self(position)
    }
}

/// Source of portfolios.
pub trait PositionStore {
    /// Ids of every portfolio the store holds, in store order.
    fn portfolio_ids(&self) -> Vec<u64>;

    /// Fetch a portfolio by id.
    fn portfolio(&self, id: u64) -> Result<Portfolio>;
}

/// Fixed price quotes keyed by position id.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    quotes: HashMap<u64, f64>,
}

impl StaticPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, position_id: u64, price: f64) -> Self {
        self.quotes.insert(position_id, price);
        self
    }

    pub fn insert(&mut self, position_id: u64, price: f64) {
        self.quotes.insert(position_id, price);
    }
}

impl PriceFeed for StaticPriceFeed {
    fn price(&self, position: &Position) -> Option<f64> {
        self.quotes.get(&position.id).copied()
    }
}

/// Portfolios held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    portfolios: Vec<Portfolio>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a portfolio.
    pub fn insert(&mut self, portfolio: Portfolio) {
        match self.portfolios.iter_mut().find(|p| p.id == portfolio.id) {
            Some(existing) => *existing = portfolio,
            None => self.portfolios.push(portfolio),
        }
    }
}

impl PositionStore for InMemoryStore {
    fn portfolio_ids(&self) -> Vec<u64> {
        self.portfolios.iter().map(|p| p.id).collect()
    }

    fn portfolio(&self, id: u64) -> Result<Portfolio> {
        self.portfolios
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::PortfolioNotFound(id))
    }
}
