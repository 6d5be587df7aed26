//! Continue a Modalidad 40 strategy from a paid history
//!
//! Checks the 12-month re-entry rule, adds owed months for any gap, plans the
//! remaining months and prints the pension of the merged ledger.
//!
//! Usage:
//!   cargo run --bin reconcile_history -- --profile demos/profile.json \
//!       --history demos/history.csv --today 2025-06-20 --resume 2025-07 --uma 15 --months 26

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};

use modalidad40::profile::{load_history, load_profile};
use modalidad40::{
    ReferenceTables, SimulationConfig, SimulationError, Simulator, StrategyCode, StrategyKind, YearMonth,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Fixed,
    Progressive,
}

impl From<KindArg> for StrategyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Fixed => StrategyKind::Fixed,
            KindArg::Progressive => StrategyKind::Progressive,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "reconcile_history")]
#[command(about = "Merge a paid Modalidad 40 history with a new plan")]
struct Args {
    /// Profile JSON file
    #[arg(long)]
    profile: PathBuf,

    /// Paid months CSV (Index,Month,SalaryBase,UmaMultiple)
    #[arg(long)]
    history: PathBuf,

    /// Evaluation date; defaults to the local date
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Month the worker resumes paying (YYYY-MM)
    #[arg(long)]
    resume: Option<YearMonth>,

    #[arg(long, value_enum, default_value = "fixed")]
    kind: KindArg,

    /// UMA level for the newly planned months
    #[arg(long, default_value = "15")]
    uma: u32,

    /// Months to plan after resumption (capped by the 58-month limit)
    #[arg(long, default_value = "58")]
    months: u32,

    /// Directory with the reference table CSVs; built-in tables otherwise
    #[arg(long)]
    tables: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let profile = load_profile(&args.profile)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("loading profile {}", args.profile.display()))?;
    let paid = load_history(&args.history)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("loading history {}", args.history.display()))?;
    let tables = match &args.tables {
        Some(dir) => ReferenceTables::from_csv_path(dir)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("loading tables from {}", dir.display()))?,
        None => ReferenceTables::official(),
    };
    let simulator = Simulator::with_tables(tables, SimulationConfig::default());
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Loaded {} paid months from {}", paid.len(), args.history.display());

    let continuation = match simulator.check_continuity(&paid, today, args.resume) {
        Ok(continuation) => continuation,
        Err(SimulationError::Ineligible(reason)) => {
            println!("Cannot continue the program: {}", reason);
            return Ok(());
        }
        Err(e) => return Err(e).context("invalid paid history"),
    };
    if let Some(deadline) = continuation.deadline {
        println!("Re-entry deadline: {}", deadline);
    }
    println!(
        "Owed months: {}, remaining capacity: {}",
        continuation.retroactive.len(),
        continuation.remaining_capacity
    );

    let reconciled = simulator
        .continue_strategy(&profile, &paid, today, args.resume, args.kind.into(), args.uma, args.months)
        .context("reconciliation failed")?;

    println!();
    println!("{:>5} {:>8} {:>12} {:>8}  {}", "Index", "Month", "SalaryBase", "UMA", "Status");
    println!("{}", "-".repeat(50));
    for month in &reconciled.ledger {
        let status = if month.is_paid() {
            "paid"
        } else if month.retroactive {
            "owed"
        } else {
            "planned"
        };
        println!(
            "{:>5} {:>8} {:>12.2} {:>8.2}  {}",
            month.index,
            month.month.to_string(),
            month.salary_base,
            month.uma_multiple,
            status
        );
    }

    let result = &reconciled.result;
    println!();
    println!(
        "Inferred strategy: {} at {:.2} UMA over {} months ({} paid, {} owed)",
        reconciled.inferred_kind,
        reconciled.average_uma,
        reconciled.ledger.len(),
        reconciled.paid_months(),
        reconciled.retroactive_months()
    );
    println!("Total investment:  ${:>14.2}", result.total_investment);
    println!("Monthly pension:   ${:>14.2}", result.monthly_pension);
    println!("First-year ROI:     {:>13.2}%", result.roi_pct);
    println!("Approximate code:   {}", StrategyCode::new(&profile, &result.params));

    Ok(())
}
