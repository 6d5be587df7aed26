//! Evaluate every strategy combination for one profile and rank them
//!
//! Usage:
//!   cargo run --release --bin generate_strategies -- --profile demos/profile.json \
//!       --start 2025-03 --target 18000 --risk balanced

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use modalidad40::profile::load_profile;
use modalidad40::{
    PensionEngine, Preference, ReferenceTables, RiskProfile, ScenarioGenerator, ScenarioResult, ScoringConfig,
    SearchSpace, SimulationConfig, StrategyCode, StrategyScorer, YearMonth,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RiskArg {
    Conservative,
    Balanced,
    Maximum,
}

impl From<RiskArg> for RiskProfile {
    fn from(risk: RiskArg) -> Self {
        match risk {
            RiskArg::Conservative => RiskProfile::Conservative,
            RiskArg::Balanced => RiskProfile::Balanced,
            RiskArg::Maximum => RiskProfile::Maximum,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "generate_strategies")]
#[command(about = "Rank Modalidad 40 strategies for a worker profile")]
struct Args {
    /// Profile JSON file
    #[arg(long)]
    profile: PathBuf,

    /// First contribution month (YYYY-MM)
    #[arg(long)]
    start: YearMonth,

    /// Desired monthly pension
    #[arg(long)]
    target: f64,

    #[arg(long, value_enum, default_value = "balanced")]
    risk: RiskArg,

    /// Lowest acceptable monthly contribution
    #[arg(long, requires = "max_budget")]
    min_budget: Option<f64>,

    /// Highest acceptable monthly contribution
    #[arg(long)]
    max_budget: Option<f64>,

    /// Stop after evaluating this many combinations
    #[arg(long)]
    max_scenarios: Option<usize>,

    #[arg(long, default_value = "5")]
    top: usize,

    /// Directory with the reference table CSVs; built-in tables otherwise
    #[arg(long)]
    tables: Option<PathBuf>,

    /// CSV file receiving every evaluated scenario
    #[arg(long, default_value = "strategies_output.csv")]
    output: PathBuf,
}

#[derive(Serialize)]
struct ScenarioRow {
    #[serde(rename = "Kind")]
    kind: String,
    #[serde(rename = "Uma")]
    uma_level: u32,
    #[serde(rename = "Months")]
    duration_months: u32,
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "Investment")]
    total_investment: f64,
    #[serde(rename = "MonthlyPension")]
    monthly_pension: f64,
    #[serde(rename = "PensionWithBonus")]
    pension_with_bonus: f64,
    #[serde(rename = "RoiPct")]
    roi_pct: f64,
    #[serde(rename = "PaybackMonths")]
    payback_months: Option<u32>,
    #[serde(rename = "ClaimAge")]
    claim_age: u32,
    #[serde(rename = "Code")]
    code: String,
}

impl ScenarioRow {
    fn new(result: &ScenarioResult, code: String) -> Self {
        Self {
            kind: result.params.kind.to_string(),
            uma_level: result.params.uma_level,
            duration_months: result.params.duration_months,
            start: result.params.start.to_string(),
            total_investment: result.total_investment,
            monthly_pension: result.monthly_pension,
            pension_with_bonus: result.pension_with_bonus,
            roi_pct: result.roi_pct,
            payback_months: result.payback_months,
            claim_age: result.claim_age,
            code,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let profile = load_profile(&args.profile)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("loading profile {}", args.profile.display()))?;
    let tables = match &args.tables {
        Some(dir) => ReferenceTables::from_csv_path(dir)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("loading tables from {}", dir.display()))?,
        None => ReferenceTables::official(),
    };
    println!("Reference tables version {}", tables.version);
    let engine = PensionEngine::new(tables, SimulationConfig::default());

    let mut space = SearchSpace::full(args.start);
    if let (Some(min), Some(max)) = (args.min_budget, args.max_budget) {
        space = space.with_monthly_budget(&engine, min, max).context("budget does not fit any UMA level")?;
    } else if let Some(max) = args.max_budget {
        space = space.with_monthly_budget(&engine, 0.0, max).context("budget does not fit any UMA level")?;
    }
    if let Some(max) = args.max_scenarios {
        space = space.with_max_scenarios(max);
    }

    let start = Instant::now();
    let report = ScenarioGenerator::new(&engine).generate(&profile, &space)?;
    println!(
        "Evaluated {} combinations in {:?}: {} kept, {} skipped",
        report.evaluated(),
        start.elapsed(),
        report.results.len(),
        report.skipped.len()
    );
    for (reason, count) in report.skip_counts() {
        println!("  skipped {:>5} ({})", count, reason);
    }

    let scorer = StrategyScorer::new(ScoringConfig {
        top_n: args.top,
        ..ScoringConfig::default()
    });
    let preference = Preference::new(args.target, args.risk.into());
    let ranked = scorer.rank(&profile, &report.results, &preference)?;

    println!("\nTop strategies for a {:.2} monthly target ({:?}):", args.target, preference.risk);
    println!(
        "{:>4} {:>12} {:>4} {:>6} {:>14} {:>12} {:>9} {:>8}  {}",
        "Rank", "Kind", "UMA", "Months", "Investment", "Pension", "ROI%", "Payback", "Code"
    );
    println!("{}", "-".repeat(120));
    for entry in &ranked {
        let result = &entry.result;
        println!(
            "{:>4} {:>12} {:>4} {:>6} {:>14.2} {:>12.2} {:>9.2} {:>8}  {}{}",
            entry.rank,
            result.params.kind.to_string(),
            result.params.uma_level,
            result.params.duration_months,
            result.total_investment,
            result.monthly_pension,
            result.roi_pct,
            result.payback_months.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string()),
            entry.code,
            if entry.ceiling { "  (ceiling)" } else { "" },
        );
    }

    let mut writer =
        csv::Writer::from_path(&args.output).with_context(|| format!("creating {}", args.output.display()))?;
    for result in &report.results {
        let code = StrategyCode::new(&profile, &result.params).encode();
        writer.serialize(ScenarioRow::new(result, code))?;
    }
    writer.flush()?;
    println!("\nAll scenarios written to {}", args.output.display());

    Ok(())
}
