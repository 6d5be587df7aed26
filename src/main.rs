//! Modalidad 40 CLI
//!
//! Simulates one contribution strategy and prints its ledger and pension.
//!
//! Usage:
//!   cargo run -- --birth-date 1966-01-15 --prior-weeks 1000 --spouse \
//!       --historical-base 150 --uma 15 --months 36 --start 2024-02

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Serialize;

use modalidad40::profile::load_profile;
use modalidad40::{
    CivilStatus, Profile, ReferenceTables, SimulationConfig, Simulator, StrategyCode, StrategyKind,
    StrategyParameters, YearMonth,
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
#[command(name = "modalidad40")]
#[command(about = "Simulate a Modalidad 40 contribution strategy")]
struct Args {
    /// Profile JSON; replaces the individual profile flags
    #[arg(long)]
    profile: Option<PathBuf>,

    #[arg(long, default_value = "1966-01-15")]
    birth_date: NaiveDate,

    /// Target claim age (60-65)
    #[arg(long, default_value = "60")]
    retirement_age: u32,

    #[arg(long, default_value = "1000")]
    prior_weeks: u32,

    /// Apply the spouse allowance
    #[arg(long)]
    spouse: bool,

    /// Daily salary base of the last registered employment
    #[arg(long, default_value = "150")]
    historical_base: f64,

    #[arg(long, value_enum, default_value = "fixed")]
    kind: KindArg,

    /// Salary base in UMA multiples (1-25)
    #[arg(long, default_value = "15")]
    uma: u32,

    /// Contribution months (1-58)
    #[arg(long, default_value = "36")]
    months: u32,

    /// First contribution month (YYYY-MM)
    #[arg(long, default_value = "2024-02")]
    start: YearMonth,

    /// Directory with the reference table CSVs; built-in tables otherwise
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Write the month-by-month ledger to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct LedgerRow {
    #[serde(rename = "Index")]
    index: u32,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "SalaryBase")]
    salary_base: f64,
    #[serde(rename = "UmaMultiple")]
    uma_multiple: f64,
    #[serde(rename = "RatePct")]
    rate_pct: f64,
    #[serde(rename = "Premium")]
    premium: f64,
    #[serde(rename = "Cumulative")]
    cumulative: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let profile = match &args.profile {
        Some(path) => load_profile(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("loading profile {}", path.display()))?,
        None => Profile::new(
            args.birth_date,
            args.retirement_age,
            args.prior_weeks,
            if args.spouse { CivilStatus::Spouse } else { CivilStatus::None },
            args.historical_base,
        ),
    };

    let config = SimulationConfig {
        detailed_output: true,
        ..SimulationConfig::default()
    };
    let tables = match &args.tables {
        Some(dir) => ReferenceTables::from_csv_path(dir)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("loading tables from {}", dir.display()))?,
        None => ReferenceTables::official(),
    };
    let simulator = Simulator::with_tables(tables, config);

    let params = StrategyParameters::new(args.kind.into(), args.uma, args.months, args.start);
    let result = simulator.run(&profile, &params).context("simulation failed")?;

    println!("Modalidad 40 simulation");
    println!("=======================\n");
    println!("Strategy: {} at {} UMA for {} months from {}", params.kind, params.uma_level, params.duration_months, params.start);
    println!("Code:     {}", StrategyCode::new(&profile, &params));
    println!();

    if let Some(schedule) = &result.schedule {
        println!("{:>5} {:>8} {:>12} {:>8} {:>12} {:>14}", "Month", "Period", "SalaryBase", "Rate%", "Premium", "Cumulative");
        println!("{}", "-".repeat(64));
        for row in &schedule.months {
            println!(
                "{:>5} {:>8} {:>12.2} {:>8.3} {:>12.2} {:>14.2}",
                row.index,
                row.month.to_string(),
                row.salary_base,
                row.rate_pct,
                row.premium,
                row.cumulative,
            );
        }
        println!();
    }

    let summary = result.summary();
    println!("Total investment:     ${:>14.2}", summary.total_investment);
    println!("Monthly pension:      ${:>14.2}", summary.monthly_pension);
    println!("  with aguinaldo:     ${:>14.2}", result.pension_with_bonus);
    println!("  without program:    ${:>14.2}", result.baseline_pension);
    println!("Annual pension:       ${:>14.2}", summary.annual_pension);
    println!("First-year ROI:        {:>13.2}%", summary.roi_pct);
    match summary.payback_months {
        Some(months) => println!("Payback:               {:>10} months", months),
        None => println!("Payback:                      never"),
    }
    println!(
        "Average salary base {:.2} ({:.2} UMA), {:.1} weeks, {:.2}% of salary, claim age {} (factor {:.2})",
        result.average_salary_base,
        result.veces_uma,
        result.total_weeks,
        result.pension_pct,
        result.claim_age,
        result.age_factor,
    );

    if let (Some(path), Some(schedule)) = (&args.output, &result.schedule) {
        let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
        for row in &schedule.months {
            writer.serialize(LedgerRow {
                index: row.index,
                month: row.month.to_string(),
                salary_base: row.salary_base,
                uma_multiple: row.uma_multiple,
                rate_pct: row.rate_pct,
                premium: row.premium,
                cumulative: row.cumulative,
            })?;
        }
        writer.flush()?;
        println!("\nLedger written to {}", path.display());
    }

    Ok(())
}
