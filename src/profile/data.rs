//! Worker profile supplied by the caller for each simulation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{age_on, YearMonth};
use crate::error::{SimResult, SimulationError};

/// Earliest and latest retirement (claim) ages accepted
pub const MIN_RETIREMENT_AGE: u32 = 60;
pub const MAX_RETIREMENT_AGE: u32 = 65;

/// Dependents that raise the pension through "asignaciones familiares"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CivilStatus {
    /// No dependent allowance
    None,
    /// Spouse or partner (+15%)
    Spouse,
}

impl CivilStatus {
    pub fn has_spouse(&self) -> bool {
        matches!(self, CivilStatus::Spouse)
    }
}

impl Default for CivilStatus {
    fn default() -> Self {
        CivilStatus::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub birth_date: NaiveDate,

    /// Target age for claiming the pension (60-65)
    pub retirement_age: u32,

    /// Weeks credited before joining Modalidad 40
    pub prior_weeks: u32,

    #[serde(default)]
    pub civil_status: CivilStatus,

    /// Daily salary base of the worker's last registered employment.
    /// Pads the 58-month average when the strategy is shorter than that.
    pub historical_salary_base: f64,
}

impl Profile {
    pub fn new(
        birth_date: NaiveDate,
        retirement_age: u32,
        prior_weeks: u32,
        civil_status: CivilStatus,
        historical_salary_base: f64,
    ) -> Self {
        Self {
            birth_date,
            retirement_age,
            prior_weeks,
            civil_status,
            historical_salary_base,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(MIN_RETIREMENT_AGE..=MAX_RETIREMENT_AGE).contains(&self.retirement_age) {
            return Err(SimulationError::out_of_range(
                "retirement_age",
                self.retirement_age,
                MIN_RETIREMENT_AGE,
                MAX_RETIREMENT_AGE,
            ));
        }
        if !self.historical_salary_base.is_finite() || self.historical_salary_base < 0.0 {
            return Err(SimulationError::OutOfRange {
                field: "historical_salary_base",
                value: self.historical_salary_base,
                min: 0.0,
                max: f64::MAX,
            });
        }
        Ok(())
    }

    /// Completed age on the first day of `month`
    pub fn age_at(&self, month: YearMonth) -> u32 {
        age_on(self.birth_date, month.first_day())
    }

    /// Claim age after contributing `duration_months` from `start`.
    ///
    /// Nobody claims before finishing the strategy, so this is the larger of
    /// the target age and the age at start plus the strategy's whole years
    /// (rounded up).
    pub fn claim_age(&self, start: YearMonth, duration_months: u32) -> u32 {
        let finished_at = self.age_at(start) + duration_months.div_ceil(12);
        finished_at.max(self.retirement_age)
    }
}
