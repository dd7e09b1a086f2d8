//! Dashboard snapshots and the reports computed from them.
//!
//! A snapshot bundles the raw data one dashboard screen needs. The report is
//! what the rendering layer displays: every figure is derived here, and a
//! figure that cannot be computed is listed as a warning instead of failing
//! the whole report.

use crate::allocation::{self, AllocationCheck};
use crate::analytics::{self, PerformanceMetrics};
use crate::composition::summarize;
use crate::config::AnalyticsConfig;
use crate::feed::PositionStore;
use crate::portfolio::{Portfolio, PortfolioSummary, PositionValuation, StrategySubtotal};
use crate::types::{
    Allocation, AllocationId, CompositionItem, CompositionShare, PerformanceSample,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Raw dashboard data as supplied by the data layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub portfolios: Vec<Portfolio>,
    /// Strategy mix still being edited in the creation form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocations: Option<Vec<Allocation>>,
    /// Account-wide daily PnL, date ascending
    #[serde(default)]
    pub daily_pnl: Vec<PerformanceSample>,
    /// Holdings to break down by category
    #[serde(default)]
    pub holdings: Vec<CompositionItem>,
}

impl DashboardSnapshot {
    /// Parse a snapshot from JSON and check its ids.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.check()?;
        Ok(snapshot)
    }

    /// Load a snapshot file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            portfolios = snapshot.portfolios.len(),
            samples = snapshot.daily_pnl.len(),
            "loaded dashboard snapshot"
        );
        Ok(snapshot)
    }

    /// Portfolio ids must be unique, and position ids unique per portfolio.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.portfolios.len());
        for portfolio in &self.portfolios {
            if !seen.insert(portfolio.id) {
                return Err(Error::DuplicatePortfolioId(portfolio.id));
            }
            portfolio.check_positions()?;
        }
        Ok(())
    }
}

impl PositionStore for DashboardSnapshot {
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

/// Everything the portfolio detail view displays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    pub id: u64,
    pub name: String,
    pub summary: PortfolioSummary,
    pub strategy_count: usize,
    pub positions: Vec<PositionValuation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<AllocationCheck>,
    pub strategies: Vec<StrategySubtotal<Option<AllocationId>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding_period_return: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_weighted_return: Option<f64>,
    /// Figures that could not be computed, with the reason
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Totals across every portfolio, as shown above the portfolio list.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub portfolio_count: usize,
    pub total_value: f64,
    pub total_pnl: f64,
    pub position_count: usize,
}

impl PortfolioTotals {
    pub fn from_reports(reports: &[PortfolioReport]) -> Self {
        reports.iter().fold(Self::default(), |mut totals, report| {
            totals.portfolio_count += 1;
            totals.total_value += report.summary.total_value;
            totals.total_pnl += report.summary.total_pnl;
            totals.position_count += report.summary.count;
            totals
        })
    }
}

/// Everything the dashboard and analytics views display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub totals: PortfolioTotals,
    pub portfolios: Vec<PortfolioReport>,
    /// Check of the draft strategy mix, when the snapshot carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_allocation: Option<AllocationCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
    pub composition: Vec<CompositionShare>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Report on one portfolio.
pub fn report_portfolio(portfolio: &Portfolio, config: &AnalyticsConfig) -> PortfolioReport {
    let mut warnings = Vec::new();
    let summary = portfolio.summary();

    if let Err(e) = summary.pnl_percentage() {
        warnings.push(format!("pnlPercentage: {}", e));
    }

    let positions = portfolio.valuations();
    for valuation in &positions {
        if let Err(e) = valuation.pnl_percentage() {
            warnings.push(format!("position {}: {}", valuation.position_id, e));
        }
    }

    let allocation = match portfolio.allocation_check(config.allocation_tolerance) {
        Ok(check) => Some(check),
        Err(e) => {
            warnings.push(format!("allocation: {}", e));
            None
        }
    };

    let (holding_period_return, time_weighted_return) = if portfolio.history.is_empty() {
        (None, None)
    } else {
        history_returns(portfolio, &mut warnings)
    };

    PortfolioReport {
        id: portfolio.id,
        name: portfolio.name.clone(),
        summary,
        strategy_count: portfolio.strategy_count(),
        positions,
        allocation,
        strategies: portfolio.strategy_breakdown(),
        holding_period_return,
        time_weighted_return,
        warnings,
    }
}

fn history_returns(
    portfolio: &Portfolio,
    warnings: &mut Vec<String>,
) -> (Option<f64>, Option<f64>) {
    let history = &portfolio.history;

    let twr = match analytics::time_weighted_return(history) {
        Ok(twr) => Some(twr),
        Err(e) => {
            warnings.push(format!("timeWeightedReturn: {}", e));
            None
        }
    };

    // Only meaningful once the curve is known to be in order
    let hpr = match (twr, history.first(), history.last()) {
        (Some(_), Some(first), Some(last)) => {
            match analytics::holding_period_return(first.value, last.value) {
                Ok(hpr) => Some(hpr),
                Err(e) => {
                    warnings.push(format!("holdingPeriodReturn: {}", e));
                    None
                }
            }
        }
        _ => None,
    };

    (hpr, twr)
}

/// Build the full dashboard report from a snapshot.
pub fn build_report(snapshot: &DashboardSnapshot, config: &AnalyticsConfig) -> DashboardReport {
    let mut warnings = Vec::new();

    let portfolios: Vec<PortfolioReport> = snapshot
        .portfolios
        .iter()
        .map(|p| report_portfolio(p, config))
        .collect();
    let totals = PortfolioTotals::from_reports(&portfolios);

    let draft_allocation = snapshot.allocations.as_ref().and_then(|draft| {
        match allocation::validate_with_tolerance(draft, config.allocation_tolerance) {
            Ok(check) => Some(check),
            Err(e) => {
                warnings.push(format!("draftAllocation: {}", e));
                None
            }
        }
    });

    let performance = if snapshot.daily_pnl.is_empty() {
        None
    } else {
        match analytics::analyze(&snapshot.daily_pnl) {
            Ok(metrics) => {
                if let Err(e) = metrics.sharpe_ratio() {
                    warnings.push(format!("sharpeRatio: {}", e));
                }
                Some(metrics)
            }
            Err(e) => {
                warnings.push(format!("performance: {}", e));
                None
            }
        }
    };

    let composition = summarize(&snapshot.holdings);

    tracing::debug!(warnings = warnings.len(), "built dashboard report");

    DashboardReport {
        totals,
        portfolios,
        draft_allocation,
        performance,
        composition,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    const SNAPSHOT: &str = r#"{
        "portfolios": [{
            "id": 1,
            "name": "Conservative Portfolio",
            "createdAt": "2023-07-15",
            "positions": [
                {"id": 1, "market": "Will Trump win the 2024 election?", "position": "No",
                 "amount": 500, "entryPrice": 0.47, "currentPrice": 0.52, "strategyId": 1},
                {"id": 2, "market": "Will Ethereum price exceed $4000 by Oct 31?",
                 "position": "Yes",
                 "amount": 350, "entryPrice": 0.28, "currentPrice": 0.32, "strategyId": 2}
            ],
            "strategies": [
                {"id": 1, "name": "Market Making", "allocation": 40},
                {"id": 2, "name": "Volume Arbitrage", "allocation": 60}
            ],
            "historicalPerformance": [
                {"date": "2023-06-15", "value": 2000.00},
                {"date": "2023-09-15", "value": 2345.67}
            ]
        }, {
            "id": 2,
            "name": "Draft",
            "strategies": [{"id": 1, "allocation": 70}]
        }],
        "dailyPnl": [
            {"date": "2023-09-11", "pnl": 25.42},
            {"date": "2023-09-12", "pnl": 42.17},
            {"date": "2023-09-13", "pnl": -12.32},
            {"date": "2023-09-14", "pnl": 89.45},
            {"date": "2023-09-15", "pnl": 54.23}
        ],
        "holdings": [
            {"name": "US Equities", "value": 10000},
            {"name": "Bonds", "value": 5000}
        ]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = DashboardSnapshot::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.portfolio_ids(), vec![1, 2]);
        assert_eq!(snapshot.daily_pnl.len(), 5);
        assert_eq!(snapshot.portfolio(1).unwrap().positions().len(), 2);
        assert!(matches!(
            snapshot.portfolio(9),
            Err(Error::PortfolioNotFound(9))
        ));
    }

    #[test]
    fn test_duplicate_portfolio_rejected() {
        let json = r#"{"portfolios":[{"id":1,"name":"a"},{"id":1,"name":"b"}]}"#;
        assert!(matches!(
            DashboardSnapshot::from_json_str(json),
            Err(Error::DuplicatePortfolioId(1))
        ));
    }

    #[test]
    fn test_build_report() {
        let snapshot = DashboardSnapshot::from_json_str(SNAPSHOT).unwrap();
        let report = build_report(&snapshot, &AnalyticsConfig::default());

        assert_eq!(report.portfolios.len(), 2);
        let conservative = &report.portfolios[0];
        assert_relative_eq!(conservative.summary.total_value, 850.0);
        assert_relative_eq!(conservative.summary.total_pnl, 39.0, epsilon = 1e-9);
        assert_eq!(conservative.strategy_count, 2);
        assert!(conservative.allocation.unwrap().is_valid);
        assert_eq!(conservative.strategies.len(), 2);
        assert_relative_eq!(
            conservative.holding_period_return.unwrap(),
            17.2835,
            epsilon = 1e-9
        );
        assert!(conservative.warnings.is_empty());

        let performance = report.performance.as_ref().unwrap();
        assert_eq!(performance.win_count, 4);
        assert_relative_eq!(performance.final_cumulative(), 198.95, epsilon = 1e-9);

        assert_relative_eq!(report.composition[0].percentage, 200.0 / 3.0, epsilon = 1e-9);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_draft_portfolio_reports_warnings() {
        let snapshot = DashboardSnapshot::from_json_str(SNAPSHOT).unwrap();
        let report = build_report(&snapshot, &AnalyticsConfig::default());
        let draft = &report.portfolios[1];

        assert_eq!(draft.summary.count, 0);
        let allocation = draft.allocation.unwrap();
        assert!(!allocation.is_valid);
        assert_relative_eq!(allocation.remaining, 30.0);
        assert!(draft.warnings.iter().any(|w| w.starts_with("pnlPercentage")));
        assert!(draft.time_weighted_return.is_none());
    }

    #[test]
    fn test_unordered_daily_pnl_is_a_warning() {
        let mut snapshot = DashboardSnapshot::from_json_str(SNAPSHOT).unwrap();
        snapshot.daily_pnl.reverse();
        let report = build_report(&snapshot, &AnalyticsConfig::default());

        assert!(report.performance.is_none());
        assert!(report.warnings[0].starts_with("performance"));
    }

    #[test]
    fn test_totals_across_portfolios() {
        let snapshot = DashboardSnapshot::from_json_str(SNAPSHOT).unwrap();
        let totals = build_report(&snapshot, &AnalyticsConfig::default()).totals;

        assert_eq!(totals.portfolio_count, 2);
        assert_eq!(totals.position_count, 2);
        assert_relative_eq!(totals.total_value, 850.0);
        assert_relative_eq!(totals.total_pnl, 39.0, epsilon = 1e-9);

        let empty = build_report(&DashboardSnapshot::default(), &AnalyticsConfig::default());
        assert_eq!(empty.totals, PortfolioTotals::default());
    }

    #[test]
    fn test_draft_allocations_checked() {
        let json = r#"{"allocations": [
            {"id": "mm", "name": "Market Making", "allocation": 70},
            {"id": "va", "name": "Volume Arbitrage", "allocation": 45}
        ]}"#;
        let snapshot = DashboardSnapshot::from_json_str(json).unwrap();
        let report = build_report(&snapshot, &AnalyticsConfig::default());

        let draft = report.draft_allocation.unwrap();
        assert!(!draft.is_valid);
        assert_relative_eq!(draft.remaining, -15.0);
        assert!(report.warnings.is_empty());

        let loose = AnalyticsConfig {
            allocation_tolerance: 20.0,
            ..AnalyticsConfig::default()
        };
        assert!(build_report(&snapshot, &loose).draft_allocation.unwrap().is_valid);
    }

    #[test]
    fn test_draft_allocation_error_is_a_warning() {
        let snapshot = DashboardSnapshot {
            allocations: Some(vec![Allocation::new(1, 40.0), Allocation::new(1, 60.0)]),
            ..DashboardSnapshot::default()
        };
        let report = build_report(&snapshot, &AnalyticsConfig::default());

        assert!(report.draft_allocation.is_none());
        assert!(report.warnings[0].starts_with("draftAllocation"));

        let without = DashboardSnapshot::from_json_str(SNAPSHOT).unwrap();
        let report = build_report(&without, &AnalyticsConfig::default());
        assert!(report.draft_allocation.is_none());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_report_json_shape() {
        let snapshot = DashboardSnapshot::from_json_str(SNAPSHOT).unwrap();
        let report = build_report(&snapshot, &AnalyticsConfig::default());
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["portfolios"][0]["summary"]["pnlPercentage"].is_number());
        assert_eq!(json["portfolios"][0]["allocation"]["isValid"], true);
        assert!(json["performance"]["winRate"].is_number());
        assert!(json["portfolios"][1]["summary"].get("pnlPercentage").is_none());
        assert_eq!(json["totals"]["portfolioCount"], 2);
        assert_eq!(json["totals"]["positionCount"], 2);
        assert!(json.get("draftAllocation").is_none());
    }

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        fs::write(&path, SNAPSHOT).unwrap();

        let snapshot = DashboardSnapshot::from_path(&path).unwrap();
        assert_eq!(snapshot.holdings.len(), 2);

        let missing = DashboardSnapshot::from_path(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
