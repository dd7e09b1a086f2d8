//! Portfolio management module.
//!
//! Provides position valuation, portfolio aggregation, and the portfolio book.

mod aggregate;
mod book;
mod valuation;

pub use aggregate::{aggregate, group_by_strategy, PortfolioSummary, StrategySubtotal};
pub use book::Portfolio;
pub use valuation::{valuate, PositionValuation};
