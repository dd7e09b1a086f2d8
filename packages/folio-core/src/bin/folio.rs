//! Folio CLI - Command line interface for dashboard analytics.
//!
//! Reads a dashboard snapshot and prints the derived figures as JSON for the
//! front end to render.

use clap::{Parser, Subcommand};
use folio_core::{
    build_report, report_portfolio, summarize, AnalyticsConfig, ApiResponse, DashboardSnapshot,
    Error, PositionStore, Result,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio analytics CLI - portfolio, allocation, and performance figures")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $FOLIO_CONFIG or ~/.folio/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dashboard snapshot JSON (defaults to snapshot_path from the config)
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full dashboard report
    Report,
    /// Report on a single portfolio
    Portfolio {
        /// Portfolio ID
        #[arg(short, long)]
        id: u64,
    },
    /// Check a portfolio's strategy allocations
    Allocations {
        /// Portfolio ID
        #[arg(short, long)]
        id: u64,
    },
    /// Analyze the daily PnL series
    Analyze,
    /// Holdings composition by category
    Composition,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(data) => {
            println!("{}", render(&ApiResponse::ok(data)));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            println!("{}", render(&ApiResponse::<()>::err(e.to_string())));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Value> {
    let config = match &cli.config {
        Some(path) => AnalyticsConfig::load_from_path(path)?,
        None => AnalyticsConfig::load()?,
    };

    let snapshot_path = cli
        .snapshot
        .or_else(|| config.snapshot_path.clone())
        .ok_or_else(|| {
            Error::InvalidConfig("no snapshot given; pass --snapshot or set snapshot_path".into())
        })?;
    let snapshot = DashboardSnapshot::from_path(&snapshot_path)?;

    match cli.command {
        Commands::Report => Ok(serde_json::to_value(build_report(&snapshot, &config))?),
        Commands::Portfolio { id } => {
            let portfolio = snapshot.portfolio(id)?;
            Ok(serde_json::to_value(report_portfolio(&portfolio, &config))?)
        }
        Commands::Allocations { id } => handle_allocations(&snapshot, id, &config),
        Commands::Analyze => handle_analyze(&snapshot),
        Commands::Composition => handle_composition(&snapshot, &config),
    }
}

fn handle_allocations(
    snapshot: &DashboardSnapshot,
    id: u64,
    config: &AnalyticsConfig,
) -> Result<Value> {
    let portfolio = snapshot.portfolio(id)?;
    let check = portfolio.allocation_check(config.allocation_tolerance)?;

    Ok(json!({
        "portfolio": portfolio.id,
        "allocations": portfolio.allocations,
        "isValid": check.is_valid,
        "remaining": check.remaining,
        "hint": check.hint(config.display_decimals),
    }))
}

fn handle_analyze(snapshot: &DashboardSnapshot) -> Result<Value> {
    let metrics = folio_core::analyze(&snapshot.daily_pnl)?;
    let mut value = serde_json::to_value(&metrics)?;

    if let (Err(e), Some(map)) = (metrics.sharpe_ratio(), value.as_object_mut()) {
        map.insert("sharpeRatio".to_string(), Value::Null);
        map.insert("sharpeError".to_string(), Value::String(e.to_string()));
    }

    Ok(value)
}

fn handle_composition(snapshot: &DashboardSnapshot, config: &AnalyticsConfig) -> Result<Value> {
    let shares: Vec<Value> = summarize(&snapshot.holdings)
        .into_iter()
        .map(|share| {
            json!({
                "category": share.category,
                "value": share.value,
                "percentage": config.round(share.percentage),
            })
        })
        .collect();

    Ok(json!({ "composition": shares }))
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }).to_string())
}
