//! Ley 73 pension formula applied to a contribution ledger

use crate::error::{ensure_amount, Ineligibility, SimResult, SimulationError};
use crate::profile::{Profile, MAX_PROGRAM_MONTHS};
use crate::projection::{
    ContributionCostCalculator, ContributionSchedule, SalaryBaseProjector, StrategyParameters, DAYS_PER_MONTH,
};
use crate::tables::ReferenceTables;

use super::result::ScenarioResult;

/// Configuration for pension simulations
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Days used to turn daily figures into monthly ones
    pub days_per_month: f64,

    /// Weeks credited per contribution month
    pub weeks_per_month: f64,

    /// Months in the salary average (250 weeks)
    pub averaging_months: u32,

    /// Minimum weeks for a Ley 73 pension
    pub minimum_weeks: u32,

    /// Weeks per increment block above the minimum
    pub weeks_per_increment: f64,

    /// Ley Fox bonus (fraction)
    pub fox_bonus: f64,

    /// Spouse allowance (fraction)
    pub spouse_allowance: f64,

    /// Keep the month-by-month ledger on each result
    pub detailed_output: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days_per_month: DAYS_PER_MONTH,
            weeks_per_month: 4.33,
            averaging_months: MAX_PROGRAM_MONTHS,
            minimum_weeks: 500,
            weeks_per_increment: 52.0,
            fox_bonus: 0.11,
            spouse_allowance: 0.15,
            detailed_output: false,
        }
    }
}

/// Intermediate figures of the pension formula
#[derive(Debug, Clone, Copy, PartialEq)]
struct PensionFigures {
    veces_uma: f64,
    pension_pct: f64,
    monthly_pension: f64,
}

/// Runs strategies through projection, costing and the pension formula
#[derive(Debug, Clone)]
pub struct PensionEngine {
    tables: ReferenceTables,
    config: SimulationConfig,
}

impl PensionEngine {
    /// Create a new engine with given reference tables and config
    pub fn new(tables: ReferenceTables, config: SimulationConfig) -> Self {
        Self { tables, config }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn cost_calculator(&self) -> ContributionCostCalculator<'_> {
        ContributionCostCalculator::new(&self.tables.contribution, self.config.days_per_month)
    }

    /// Build the planned contribution ledger for a strategy
    pub fn schedule(&self, params: &StrategyParameters) -> SimResult<ContributionSchedule> {
        params.validate()?;
        let projector = SalaryBaseProjector::new(params.kind, params.uma_level as f64, params.start, &self.tables.uma)?;
        self.cost_calculator().schedule_for(params, &projector)
    }

    /// Run one strategy from scratch
    pub fn simulate(&self, profile: &Profile, params: &StrategyParameters) -> SimResult<ScenarioResult> {
        profile.validate()?;
        let schedule = self.schedule(params)?;
        self.evaluate(profile, *params, schedule)
    }

    /// Apply the pension formula to an already priced ledger.
    ///
    /// `params` is carried through to the result as-is; the formula only
    /// reads the ledger and the profile.
    pub fn evaluate(
        &self,
        profile: &Profile,
        params: StrategyParameters,
        schedule: ContributionSchedule,
    ) -> SimResult<ScenarioResult> {
        let (first, last) = match (schedule.first_month(), schedule.last_month()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SimulationError::InvalidHistory("empty contribution ledger".to_string())),
        };
        let months = schedule.len() as u32;

        let total_weeks = profile.prior_weeks as f64 + months as f64 * self.config.weeks_per_month;
        if total_weeks < self.config.minimum_weeks as f64 {
            return Err(Ineligibility::InsufficientWeeks {
                total_weeks,
                required: self.config.minimum_weeks,
            }
            .into());
        }

        let claim_age = profile.claim_age(first, months);
        let age_factor = self.age_factor(claim_age)?;
        let retirement_year = last.next().effective_uma_year();

        let salaries: Vec<f64> = schedule.salary_bases().collect();
        let average_salary_base = ensure_amount(
            "average_salary_base",
            self.average_salary_base(&salaries, profile.historical_salary_base),
        )?;

        let figures = self.pension_figures(profile, average_salary_base, total_weeks, retirement_year, age_factor)?;
        let monthly_pension = ensure_amount("monthly_pension", figures.monthly_pension)?;
        let pension_with_bonus = ensure_amount("pension_with_bonus", monthly_pension * 13.0 / 12.0)?;

        let total_investment = ensure_amount("total_investment", schedule.total_investment())?;
        if total_investment <= 0.0 {
            return Err(SimulationError::NonFinite { field: "total_investment" });
        }

        let roi_pct = (monthly_pension * 12.0 / total_investment - 1.0) * 100.0;
        if !roi_pct.is_finite() {
            return Err(SimulationError::NonFinite { field: "roi_pct" });
        }

        let baseline_pension = self.baseline_pension(profile, retirement_year, age_factor)?;
        let incremental = monthly_pension - baseline_pension;
        let payback_months = if incremental > 0.0 {
            Some((total_investment / incremental).ceil() as u32)
        } else {
            None
        };

        Ok(ScenarioResult {
            params,
            total_investment,
            monthly_pension,
            pension_with_bonus,
            contribution_rate_pct: schedule.initial_rate_pct(),
            age_factor,
            roi_pct,
            payback_months,
            average_salary_base,
            veces_uma: figures.veces_uma,
            total_weeks,
            pension_pct: figures.pension_pct,
            claim_age,
            retirement_year,
            baseline_pension,
            schedule: self.config.detailed_output.then_some(schedule),
        })
    }

    /// Average daily salary over the averaging window.
    ///
    /// Only the most recent `averaging_months` values count; a shorter
    /// ledger is padded with the historical salary base, each padded month
    /// weighted like a computed one.
    pub fn average_salary_base(&self, salaries: &[f64], historical_salary_base: f64) -> f64 {
        let window = self.config.averaging_months as usize;
        let recent = &salaries[salaries.len().saturating_sub(window)..];
        let padded = window - recent.len();
        (recent.iter().sum::<f64>() + padded as f64 * historical_salary_base) / window as f64
    }

    fn age_factor(&self, claim_age: u32) -> SimResult<f64> {
        self.tables.age_factors.factor(claim_age).ok_or_else(|| {
            Ineligibility::BelowMinimumAge {
                age: claim_age,
                minimum: self.tables.age_factors.minimum_age(),
            }
            .into()
        })
    }

    fn pension_figures(
        &self,
        profile: &Profile,
        average_salary_base: f64,
        total_weeks: f64,
        retirement_year: i32,
        age_factor: f64,
    ) -> SimResult<PensionFigures> {
        let uma = self.tables.uma.value(retirement_year)?;
        let veces_uma = average_salary_base / uma;
        let bracket = self
            .tables
            .brackets
            .lookup(veces_uma)
            .ok_or(SimulationError::NonFinite { field: "veces_uma" })?;

        let increment_blocks =
            ((total_weeks - self.config.minimum_weeks as f64) / self.config.weeks_per_increment).floor().max(0.0);
        let pension_pct = bracket.base_pct + increment_blocks * bracket.increment_pct;

        let pension_base = pension_pct / 100.0 * average_salary_base * self.config.days_per_month;
        let allowance = if profile.civil_status.has_spouse() {
            self.config.spouse_allowance
        } else {
            0.0
        };
        let monthly_pension = pension_base * age_factor * (1.0 + self.config.fox_bonus) * (1.0 + allowance);

        Ok(PensionFigures {
            veces_uma,
            pension_pct,
            monthly_pension,
        })
    }

    /// Pension the worker would get without joining the program: the
    /// historical salary as the whole average and only the prior weeks.
    fn baseline_pension(&self, profile: &Profile, retirement_year: i32, age_factor: f64) -> SimResult<f64> {
        let weeks = profile.prior_weeks as f64;
        if weeks < self.config.minimum_weeks as f64 || profile.historical_salary_base <= 0.0 {
            return Ok(0.0);
        }
        let figures = self.pension_figures(profile, profile.historical_salary_base, weeks, retirement_year, age_factor)?;
        ensure_amount("baseline_pension", figures.monthly_pension)
    }
}

impl Default for PensionEngine {
    fn default() -> Self {
        Self::new(ReferenceTables::official(), SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use crate::profile::CivilStatus;
    use crate::projection::StrategyKind;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn reference_profile() -> Profile {
        Profile::new(
            NaiveDate::from_ymd_opt(1966, 1, 15).unwrap(),
            60,
            1000,
            CivilStatus::Spouse,
            150.0,
        )
    }

    fn reference_params() -> StrategyParameters {
        StrategyParameters::new(StrategyKind::Fixed, 15, 36, YearMonth::new(2024, 2).unwrap())
    }

    #[test]
    fn test_reference_scenario() {
        let engine = PensionEngine::default();
        let result = engine.simulate(&reference_profile(), &reference_params()).unwrap();

        // (36 × 1628.55 + 22 × 150) / 58
        assert_relative_eq!(result.average_salary_base, 61_927.8 / 58.0, epsilon = 1e-9);
        assert_eq!(result.retirement_year, 2027);
        assert_relative_eq!(result.veces_uma, 61_927.8 / 58.0 / 122.0, epsilon = 1e-9);
        assert_relative_eq!(result.total_weeks, 1155.88, epsilon = 1e-9);
        // 13.00 + 12 blocks × 2.45
        assert_relative_eq!(result.pension_pct, 42.4, epsilon = 1e-9);
        assert_eq!(result.claim_age, 61);
        assert_eq!(result.age_factor, 0.80);
        assert_eq!(result.contribution_rate_pct, 12.256);

        assert_relative_eq!(result.total_investment, 239_501.49, epsilon = 0.5);
        assert_relative_eq!(result.monthly_pension, 14_054.26, epsilon = 0.5);
        assert_relative_eq!(result.pension_with_bonus, result.monthly_pension * 13.0 / 12.0, epsilon = 1e-9);
        assert_relative_eq!(result.roi_pct, -29.58, epsilon = 0.05);
        assert_relative_eq!(result.baseline_pension, 3_931.90, epsilon = 0.5);
        assert_eq!(result.payback_months, Some(24));
        assert!(result.schedule.is_none());
    }

    #[test]
    fn test_reference_scenario_is_deterministic() {
        let engine = PensionEngine::default();
        let a = engine.simulate(&reference_profile(), &reference_params()).unwrap();
        let b = engine.simulate(&reference_profile(), &reference_params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insufficient_weeks_rejected() {
        let engine = PensionEngine::default();
        let mut profile = reference_profile();
        profile.prior_weeks = 0;
        let params = StrategyParameters::new(StrategyKind::Fixed, 25, 58, YearMonth::new(2024, 2).unwrap());

        match engine.simulate(&profile, &params) {
            Err(SimulationError::Ineligible(Ineligibility::InsufficientWeeks { total_weeks, required })) => {
                assert_relative_eq!(total_weeks, 58.0 * 4.33, epsilon = 1e-9);
                assert_eq!(required, 500);
            }
            other => panic!("expected insufficient weeks, got {:?}", other),
        }

        // Enough prior weeks to cross 500 together with the program
        profile.prior_weeks = 249;
        assert!(engine.simulate(&profile, &params).is_ok());
    }

    #[test]
    fn test_average_pads_with_historical_base() {
        let engine = PensionEngine::default();
        let computed = vec![1000.0; 20];
        let expected = (20.0 * 1000.0 + 38.0 * 150.0) / 58.0;
        assert_relative_eq!(engine.average_salary_base(&computed, 150.0), expected, epsilon = 1e-9);

        let full = vec![500.0; 58];
        assert_relative_eq!(engine.average_salary_base(&full, 150.0), 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spouse_allowance() {
        let engine = PensionEngine::default();
        let with_spouse = engine.simulate(&reference_profile(), &reference_params()).unwrap();

        let mut single = reference_profile();
        single.civil_status = CivilStatus::None;
        let alone = engine.simulate(&single, &reference_params()).unwrap();

        assert_relative_eq!(with_spouse.monthly_pension, alone.monthly_pension * 1.15, epsilon = 1e-6);
    }

    #[test]
    fn test_later_claim_raises_age_factor() {
        let engine = PensionEngine::default();
        let mut profile = reference_profile();
        profile.retirement_age = 65;
        let result = engine.simulate(&profile, &reference_params()).unwrap();
        assert_eq!(result.claim_age, 65);
        assert_eq!(result.age_factor, 1.0);
    }

    #[test]
    fn test_detailed_output_keeps_ledger() {
        let config = SimulationConfig {
            detailed_output: true,
            ..Default::default()
        };
        let engine = PensionEngine::new(ReferenceTables::official(), config);
        let result = engine.simulate(&reference_profile(), &reference_params()).unwrap();
        let schedule = result.schedule.as_ref().unwrap();
        assert_eq!(schedule.len(), 36);
        assert_relative_eq!(schedule.total_investment(), result.total_investment, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_inputs_are_errors() {
        let engine = PensionEngine::default();
        let mut params = reference_params();
        params.uma_level = 30;
        assert!(matches!(
            engine.simulate(&reference_profile(), &params),
            Err(SimulationError::OutOfRange { field: "uma_level", .. })
        ));

        let late = StrategyParameters::new(StrategyKind::Fixed, 10, 12, YearMonth::new(2036, 3).unwrap());
        assert!(matches!(
            engine.simulate(&reference_profile(), &late),
            Err(SimulationError::YearNotCovered { .. })
        ));
    }
}
