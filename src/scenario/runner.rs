//! Scenario runner for single and batch simulations
//!
//! Builds the engine once, then runs any number of strategies, profiles or
//! continuations against the same read-only reference tables.

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::calendar::YearMonth;
use crate::continuity::{Continuation, ContinuityValidator};
use crate::error::SimResult;
use crate::pension::{PensionEngine, ScenarioResult, SimulationConfig};
use crate::profile::{ContributionMonth, Profile};
use crate::projection::{StrategyKind, StrategyParameters};
use crate::reconciliation::{ReconciledStrategy, ReconciliationAdapter};
use crate::tables::ReferenceTables;

/// Pre-loaded simulator for repeated runs
///
/// # Example
/// ```ignore
/// let simulator = Simulator::new();
///
/// for uma in [10, 15, 25] {
///     let params = StrategyParameters::new(StrategyKind::Fixed, uma, 36, start);
///     let result = simulator.run(&profile, &params)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Simulator {
    engine: PensionEngine,
}

impl Simulator {
    /// Create simulator with the built-in tables and default config
    pub fn new() -> Self {
        Self {
            engine: PensionEngine::default(),
        }
    }

    /// Create simulator by loading tables from CSV files
    pub fn from_csv() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_tables(ReferenceTables::from_csv()?, SimulationConfig::default()))
    }

    /// Create simulator from a specific tables directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_tables(ReferenceTables::from_csv_path(path)?, SimulationConfig::default()))
    }

    /// Create simulator with pre-built tables and config
    pub fn with_tables(tables: ReferenceTables, config: SimulationConfig) -> Self {
        Self {
            engine: PensionEngine::new(tables, config),
        }
    }

    pub fn engine(&self) -> &PensionEngine {
        &self.engine
    }

    /// Run a single strategy
    pub fn run(&self, profile: &Profile, params: &StrategyParameters) -> SimResult<ScenarioResult> {
        self.engine.simulate(profile, params)
    }

    /// Run the same strategy for many profiles
    pub fn run_batch(&self, profiles: &[Profile], params: &StrategyParameters) -> Vec<SimResult<ScenarioResult>> {
        profiles.par_iter().map(|p| self.engine.simulate(p, params)).collect()
    }

    /// Run many strategies for a single profile
    pub fn run_scenarios(&self, profile: &Profile, params: &[StrategyParameters]) -> Vec<SimResult<ScenarioResult>> {
        params.par_iter().map(|p| self.engine.simulate(profile, p)).collect()
    }

    /// Check whether a paid history can be continued
    pub fn check_continuity(
        &self,
        paid: &[ContributionMonth],
        today: NaiveDate,
        resumption: Option<YearMonth>,
    ) -> SimResult<Continuation> {
        ContinuityValidator::new(&self.engine.tables().uma).check(paid, today, resumption)
    }

    /// Full pipeline for a worker already in the program: continuity check,
    /// owed months, new plan, merged evaluation.
    #[allow(clippy::too_many_arguments)]
    pub fn continue_strategy(
        &self,
        profile: &Profile,
        paid: &[ContributionMonth],
        today: NaiveDate,
        resumption: Option<YearMonth>,
        kind: StrategyKind,
        uma_level: u32,
        months: u32,
    ) -> SimResult<ReconciledStrategy> {
        let continuation = self.check_continuity(paid, today, resumption)?;
        ReconciliationAdapter::new(&self.engine).reconcile_continuation(profile, paid, &continuation, kind, uma_level, months)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
