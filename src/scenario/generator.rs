//! Batch enumeration of strategy combinations
//!
//! Every (kind, UMA level, duration) combination is independent, so the
//! search space is evaluated as a parallel map with rayon.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rayon::prelude::*;
use serde::Serialize;

use crate::calendar::YearMonth;
use crate::error::{SimResult, SimulationError};
use crate::pension::{PensionEngine, ScenarioResult};
use crate::profile::{Profile, MAX_PROGRAM_MONTHS};
use crate::projection::{StrategyKind, StrategyParameters, MAX_UMA_LEVEL};

/// Combinations to evaluate
#[derive(Debug, Clone)]
pub struct SearchSpace {
    pub kinds: Vec<StrategyKind>,
    pub uma_levels: RangeInclusive<u32>,
    pub durations: RangeInclusive<u32>,
    pub start: YearMonth,
    /// Stop enumerating after this many combinations
    pub max_scenarios: Option<usize>,
}

impl SearchSpace {
    /// Both kinds, UMA 1-25, 1-58 months
    pub fn full(start: YearMonth) -> Self {
        Self {
            kinds: StrategyKind::ALL.to_vec(),
            uma_levels: 1..=MAX_UMA_LEVEL,
            durations: 1..=MAX_PROGRAM_MONTHS,
            start,
            max_scenarios: None,
        }
    }

    pub fn with_uma_levels(mut self, levels: RangeInclusive<u32>) -> Self {
        self.uma_levels = levels;
        self
    }

    pub fn with_durations(mut self, durations: RangeInclusive<u32>) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_max_scenarios(mut self, max: usize) -> Self {
        self.max_scenarios = Some(max);
        self
    }

    /// Restrict UMA levels to those whose first monthly premium fits in
    /// `[min_budget, max_budget]`.
    pub fn with_monthly_budget(self, engine: &PensionEngine, min_budget: f64, max_budget: f64) -> SimResult<Self> {
        if !(min_budget.is_finite() && max_budget.is_finite()) || min_budget < 0.0 || max_budget < min_budget {
            return Err(SimulationError::OutOfRange {
                field: "monthly_budget",
                value: max_budget,
                min: min_budget,
                max: f64::MAX,
            });
        }
        let uma = engine.tables().uma.value(self.start.effective_uma_year())?;
        let (_, cost_per_level) = engine.cost_calculator().monthly_premium(uma, self.start.year)?;

        let low = (min_budget / cost_per_level).ceil().max(1.0) as u32;
        let high = ((max_budget / cost_per_level).floor() as u32).min(MAX_UMA_LEVEL);
        if low > high {
            return Err(SimulationError::OutOfRange {
                field: "monthly_budget",
                value: max_budget,
                min: cost_per_level,
                max: cost_per_level * MAX_UMA_LEVEL as f64,
            });
        }
        log::debug!(
            "budget {:.2}..{:.2} maps to UMA {}..{} ({:.2} per level)",
            min_budget,
            max_budget,
            low,
            high,
            cost_per_level
        );
        Ok(self.with_uma_levels(low..=high))
    }

    pub fn validate(&self) -> SimResult<()> {
        let (uma_lo, uma_hi) = (*self.uma_levels.start(), *self.uma_levels.end());
        if uma_lo < 1 || uma_hi > MAX_UMA_LEVEL || uma_lo > uma_hi {
            return Err(SimulationError::out_of_range("uma_levels", uma_hi, 1, MAX_UMA_LEVEL));
        }
        let (dur_lo, dur_hi) = (*self.durations.start(), *self.durations.end());
        if dur_lo < 1 || dur_hi > MAX_PROGRAM_MONTHS || dur_lo > dur_hi {
            return Err(SimulationError::out_of_range("durations", dur_hi, 1, MAX_PROGRAM_MONTHS));
        }
        Ok(())
    }

    /// Cartesian product in a stable order: kind, then UMA, then duration
    pub fn combinations(&self) -> Vec<StrategyParameters> {
        let all = self.kinds.iter().flat_map(|&kind| {
            self.uma_levels.clone().flat_map(move |uma| {
                self.durations
                    .clone()
                    .map(move |duration| StrategyParameters::new(kind, uma, duration, self.start))
            })
        });
        match self.max_scenarios {
            Some(max) => all.take(max).collect(),
            None => all.collect(),
        }
    }
}

/// A combination that produced no result, and why
#[derive(Debug, Clone, Serialize)]
pub struct SkippedScenario {
    pub params: StrategyParameters,
    pub reason: String,
    pub kind: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub results: Vec<ScenarioResult>,
    pub skipped: Vec<SkippedScenario>,
}

impl GenerationReport {
    /// Number of skipped combinations per error kind
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for skipped in &self.skipped {
            *counts.entry(skipped.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn evaluated(&self) -> usize {
        self.results.len() + self.skipped.len()
    }
}

pub struct ScenarioGenerator<'e> {
    engine: &'e PensionEngine,
}

impl<'e> ScenarioGenerator<'e> {
    pub fn new(engine: &'e PensionEngine) -> Self {
        Self { engine }
    }

    /// Evaluate every combination of `space` for `profile`.
    ///
    /// Failed combinations are skipped and reported; only an invalid
    /// profile or search space fails the whole batch.
    pub fn generate(&self, profile: &Profile, space: &SearchSpace) -> SimResult<GenerationReport> {
        profile.validate()?;
        space.validate()?;

        let combinations = space.combinations();
        log::info!("evaluating {} strategy combinations from {}", combinations.len(), space.start);

        let outcomes: Vec<(StrategyParameters, SimResult<ScenarioResult>)> = combinations
            .par_iter()
            .map(|params| (*params, self.engine.simulate(profile, params)))
            .collect();

        let mut report = GenerationReport::default();
        for (params, outcome) in outcomes {
            match outcome {
                Ok(result) => report.results.push(result),
                Err(err) => report.skipped.push(SkippedScenario {
                    params,
                    kind: err.kind(),
                    reason: err.to_string(),
                }),
            }
        }

        if !report.skipped.is_empty() {
            log::debug!("skipped combinations by reason: {:?}", report.skip_counts());
        }
        log::info!("{} scenarios kept, {} skipped", report.results.len(), report.skipped.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CivilStatus;
    use chrono::NaiveDate;
    use proptest::prelude::{prop_assert, proptest};

    fn start() -> YearMonth {
        YearMonth::new(2024, 2).unwrap()
    }

    fn profile(prior_weeks: u32) -> Profile {
        Profile::new(
            NaiveDate::from_ymd_opt(1966, 1, 15).unwrap(),
            60,
            prior_weeks,
            CivilStatus::Spouse,
            150.0,
        )
    }

    #[test]
    fn test_full_space_size() {
        let space = SearchSpace::full(start());
        let combos = space.combinations();
        assert_eq!(combos.len(), 2 * 25 * 58);
        assert_eq!(combos[0], StrategyParameters::new(StrategyKind::Fixed, 1, 1, start()));
        assert_eq!(
            combos.last().copied(),
            Some(StrategyParameters::new(StrategyKind::Progressive, 25, 58, start()))
        );
    }

    #[test]
    fn test_max_scenarios_stops_enumeration() {
        let space = SearchSpace::full(start()).with_max_scenarios(100);
        assert_eq!(space.combinations().len(), 100);
    }

    #[test]
    fn test_generate_full_space() {
        let engine = PensionEngine::default();
        let generator = ScenarioGenerator::new(&engine);
        let report = generator.generate(&profile(1000), &SearchSpace::full(start())).unwrap();

        assert_eq!(report.evaluated(), 2900);
        assert!(report.skipped.is_empty(), "unexpected skips: {:?}", report.skip_counts());
        for result in &report.results {
            assert!(result.monthly_pension > 0.0 && result.monthly_pension.is_finite());
            assert!(result.total_investment > 0.0 && result.total_investment.is_finite());
            assert!(result.roi_pct.is_finite());
        }
    }

    #[test]
    fn test_ineligible_combinations_are_skipped() {
        let engine = PensionEngine::default();
        let generator = ScenarioGenerator::new(&engine);
        // 300 prior weeks: needs at least 47 months (203.5 weeks) to reach 500
        let report = generator
            .generate(&profile(300), &SearchSpace::full(start()).with_uma_levels(10..=10))
            .unwrap();

        assert_eq!(report.evaluated(), 2 * 58);
        assert_eq!(report.skip_counts().get("insufficient_weeks"), Some(&(2 * 46)));
        assert!(report.results.iter().all(|r| r.params.duration_months >= 47));
    }

    #[test]
    fn test_budget_maps_to_uma_range() {
        let engine = PensionEngine::default();
        // One UMA level in Feb 2024 costs 108.57 × 30.4 × 12.256% ≈ 404.51
        let space = SearchSpace::full(start()).with_monthly_budget(&engine, 2000.0, 6000.0).unwrap();
        assert_eq!(space.uma_levels, 5..=14);

        let capped = SearchSpace::full(start()).with_monthly_budget(&engine, 0.0, 1_000_000.0).unwrap();
        assert_eq!(capped.uma_levels, 1..=25);

        assert!(SearchSpace::full(start()).with_monthly_budget(&engine, 100.0, 200.0).is_err());
        assert!(SearchSpace::full(start()).with_monthly_budget(&engine, 500.0, 100.0).is_err());
    }

    #[test]
    fn test_invalid_space_rejected() {
        let engine = PensionEngine::default();
        let generator = ScenarioGenerator::new(&engine);
        let space = SearchSpace::full(start()).with_durations(1..=60);
        assert!(generator.generate(&profile(1000), &space).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_every_combination_is_finite_or_rejected(
            progressive in proptest::bool::ANY,
            uma_level in 1u32..=25,
            duration in 1u32..=58,
            start_year in 2016i32..=2030,
            start_month in 1u32..=12,
            birth_year in 1955i32..=1975,
            retirement_age in 60u32..=65,
            prior_weeks in 0u32..2500,
            historical_cents in 0u32..300_000,
            spouse in proptest::bool::ANY
        ) {
            let engine = PensionEngine::default();
            let kind = if progressive { StrategyKind::Progressive } else { StrategyKind::Fixed };
            let params = StrategyParameters::new(kind, uma_level, duration, YearMonth::new(start_year, start_month).unwrap());
            let profile = Profile::new(
                NaiveDate::from_ymd_opt(birth_year, 6, 1).unwrap(),
                retirement_age,
                prior_weeks,
                if spouse { CivilStatus::Spouse } else { CivilStatus::None },
                historical_cents as f64 / 100.0,
            );

            if let Ok(result) = engine.simulate(&profile, &params) {
                for value in [
                    result.total_investment,
                    result.monthly_pension,
                    result.pension_with_bonus,
                    result.average_salary_base,
                    result.baseline_pension,
                    result.total_weeks,
                ] {
                    prop_assert!(value.is_finite() && value >= 0.0);
                }
                prop_assert!(result.roi_pct.is_finite());
                prop_assert!(result.total_weeks >= 500.0);
                prop_assert!(result.claim_age >= retirement_age);
            }
        }
    }
}
