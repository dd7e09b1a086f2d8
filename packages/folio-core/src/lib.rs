//! Folio Core - Portfolio and strategy performance analytics.
//!
//! This crate provides the calculations behind the investment dashboard:
//!
//! - **Position valuation**: P/L and return percentage per position
//! - **Allocation validation**: strategy mixes must total 100%
//! - **Portfolio aggregation**: totals, counts, and per-strategy subtotals
//! - **Performance analytics**: cumulative PnL, win rate, drawdown, Sharpe ratio
//! - **Composition**: percentage breakdown of a total across categories
//!
//! Every calculation is a pure function over borrowed inputs. Data enters
//! through the [`feed::PriceFeed`] and [`feed::PositionStore`] capabilities.
//!
//! # Example
//!
//! ```rust
//! use folio_core::{aggregate, Position};
//!
//! let positions = vec![Position::new(1, "Will it rain?", "Yes", 500.0, 0.47, 0.52)];
//! let summary = aggregate(&positions);
//!
//! assert_eq!(summary.count, 1);
//! assert!((summary.total_pnl - 25.0).abs() < 1e-9);
//! ```

pub mod allocation;
pub mod analytics;
pub mod composition;
pub mod config;
pub mod feed;
pub mod portfolio;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use types::{
    Allocation, AllocationId, ApiResponse, CompositionItem, CompositionShare, PerformanceSample,
    Position, ValuePoint,
};

// Re-export main functionality
pub use allocation::{validate, validate_with_tolerance, AllocationCheck, AllocationStatus};
pub use analytics::{
    analyze, holding_period_return, max_drawdown, sharpe_ratio, time_weighted_return,
    value_changes, CumulativePoint, PerformanceMetrics,
};
pub use composition::summarize;
pub use config::AnalyticsConfig;
pub use feed::{InMemoryStore, PositionStore, PriceFeed, StaticPriceFeed};
pub use portfolio::{
    aggregate, group_by_strategy, valuate, Portfolio, PortfolioSummary, PositionValuation,
    StrategySubtotal,
};
pub use snapshot::{
    build_report, report_portfolio, DashboardReport, DashboardSnapshot, PortfolioReport,
    PortfolioTotals,
};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Zero variance: Sharpe ratio is undefined for a constant series")]
    ZeroVariance,

    #[error("Unordered series: sample {index} is not dated after the one before it")]
    UnorderedSeries { index: usize },

    #[error("Duplicate allocation id: {0}")]
    DuplicateAllocationId(AllocationId),

    #[error("Allocation mismatch: {remaining}% remaining")]
    AllocationMismatch { remaining: f64 },

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Duplicate position id: {0}")]
    DuplicatePositionId(u64),

    #[error("Position not found: {0}")]
    PositionNotFound(u64),

    #[error("Duplicate portfolio id: {0}")]
    DuplicatePortfolioId(u64),

    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(u64),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
