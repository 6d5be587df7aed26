//! Scenario output structures

use serde::{Deserialize, Serialize};

use crate::projection::{ContributionSchedule, StrategyParameters};

/// Outcome of one strategy run through the full pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub params: StrategyParameters,

    // Headline figures
    pub total_investment: f64,
    pub monthly_pension: f64,
    /// Monthly pension with the aguinaldo spread over twelve months
    pub pension_with_bonus: f64,
    /// Contribution rate of the first contribution month (percent)
    pub contribution_rate_pct: f64,
    pub age_factor: f64,
    pub roi_pct: f64,
    /// Months of incremental pension needed to recover the investment;
    /// `None` when the program does not beat the no-program baseline
    pub payback_months: Option<u32>,

    // Formula intermediates
    pub average_salary_base: f64,
    pub veces_uma: f64,
    pub total_weeks: f64,
    pub pension_pct: f64,
    pub claim_age: u32,
    pub retirement_year: i32,
    pub baseline_pension: f64,

    /// Month-by-month ledger, only kept when detailed output is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ContributionSchedule>,
}

/// Compact summary for reporting
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub months: u32,
    pub total_investment: f64,
    pub monthly_pension: f64,
    pub annual_pension: f64,
    pub incremental_pension: f64,
    pub roi_pct: f64,
    pub payback_months: Option<u32>,
}

impl ScenarioResult {
    pub fn annual_pension(&self) -> f64 {
        self.monthly_pension * 12.0
    }

    /// Monthly pension gained over the no-program baseline
    pub fn incremental_pension(&self) -> f64 {
        (self.monthly_pension - self.baseline_pension).max(0.0)
    }

    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            months: self.params.duration_months,
            total_investment: self.total_investment,
            monthly_pension: self.monthly_pension,
            annual_pension: self.annual_pension(),
            incremental_pension: self.incremental_pension(),
            roi_pct: self.roi_pct,
            payback_months: self.payback_months,
        }
    }
}
