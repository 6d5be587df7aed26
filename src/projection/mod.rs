//! Salary base projection and contribution costing

mod strategy;
mod projector;
mod cost;
mod ledger;

pub use strategy::{StrategyKind, StrategyParameters, MAX_UMA_LEVEL};
pub use projector::SalaryBaseProjector;
pub use cost::{ContributionCostCalculator, DAYS_PER_MONTH};
pub use ledger::{ContributionSchedule, MonthlyContribution};
