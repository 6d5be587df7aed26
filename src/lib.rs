//! Modalidad 40 pension simulator
//!
//! Projects voluntary IMSS contributions under the Ley 73 regime:
//! - Salary base projection (fixed or UMA-indexed) and contribution costing
//! - Ley 73 pension formula with age factor, Ley Fox bonus and spouse allowance
//! - 12-month re-entry rule and retroactive months for interrupted histories
//! - Reconciliation of paid history with a newly planned schedule
//! - Parallel batch generation, preference-based ranking and replayable codes

pub mod calendar;
pub mod error;
pub mod tables;
pub mod profile;
pub mod projection;
pub mod pension;
pub mod continuity;
pub mod reconciliation;
pub mod scenario;

// Re-export commonly used types
pub use calendar::YearMonth;
pub use error::{CodeError, Ineligibility, SimResult, SimulationError};
pub use tables::ReferenceTables;
pub use profile::{CivilStatus, ContributionMonth, MonthStatus, Profile};
pub use projection::{ContributionSchedule, StrategyKind, StrategyParameters};
pub use pension::{PensionEngine, ScenarioResult, SimulationConfig};
pub use continuity::{Continuation, ContinuityValidator};
pub use reconciliation::{ReconciledStrategy, ReconciliationAdapter};
pub use scenario::{
    Preference, RankedStrategy, RiskProfile, ScenarioGenerator, ScoringConfig, SearchSpace, Simulator, StrategyCode,
    StrategyScorer,
};
