//! Merge a paid contribution history with a newly planned schedule
//!
//! Workers who are already in the program have a mix of paid, owed and
//! planned months. This module lays them out as one index-contiguous
//! ledger, re-prices it and evaluates the pension as if it were a single
//! strategy run from scratch.

use serde::Serialize;

use crate::calendar::YearMonth;
use crate::continuity::Continuation;
use crate::error::{SimResult, SimulationError};
use crate::pension::{PensionEngine, ScenarioResult};
use crate::profile::{ContributionMonth, MonthStatus, Profile, MAX_PROGRAM_MONTHS};
use crate::projection::{SalaryBaseProjector, StrategyKind, StrategyParameters, MAX_UMA_LEVEL};

/// A merged ledger and its pension evaluation
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledStrategy {
    pub profile: Profile,
    pub ledger: Vec<ContributionMonth>,
    pub inferred_kind: StrategyKind,
    /// Month-weighted average UMA multiple across the ledger
    pub average_uma: f64,
    pub result: ScenarioResult,
}

impl ReconciledStrategy {
    pub fn paid_months(&self) -> usize {
        self.ledger.iter().filter(|m| m.is_paid()).count()
    }

    pub fn retroactive_months(&self) -> usize {
        self.ledger.iter().filter(|m| m.retroactive).count()
    }
}

pub struct ReconciliationAdapter<'e> {
    engine: &'e PensionEngine,
}

impl<'e> ReconciliationAdapter<'e> {
    pub fn new(engine: &'e PensionEngine) -> Self {
        Self { engine }
    }

    /// Plan up to `months` new months after a continuation, capped by the
    /// remaining program capacity.
    pub fn plan_remaining(
        &self,
        continuation: &Continuation,
        kind: StrategyKind,
        uma_level: u32,
        months: u32,
    ) -> SimResult<Vec<ContributionMonth>> {
        if !(1..=MAX_UMA_LEVEL).contains(&uma_level) {
            return Err(SimulationError::out_of_range("uma_level", uma_level, 1, MAX_UMA_LEVEL));
        }
        let count = months.min(continuation.remaining_capacity);
        if count == 0 {
            return Ok(Vec::new());
        }
        let start = continuation
            .next_month
            .ok_or_else(|| SimulationError::InvalidHistory("no start month for the planned schedule".to_string()))?;

        let projector = SalaryBaseProjector::new(kind, uma_level as f64, start, &self.engine.tables().uma)?;
        let first_index = continuation.next_index();
        start
            .iter_months(count)
            .enumerate()
            .map(|(offset, month)| {
                let salary_base = projector.salary_base(offset as u32 + 1)?;
                Ok(ContributionMonth::planned(first_index + offset as u32, month, salary_base, uma_level as f64))
            })
            .collect()
    }

    /// Continuation + new plan in one step: owed months are placed before the
    /// planned ones and everything is evaluated together.
    pub fn reconcile_continuation(
        &self,
        profile: &Profile,
        paid: &[ContributionMonth],
        continuation: &Continuation,
        kind: StrategyKind,
        uma_level: u32,
        months: u32,
    ) -> SimResult<ReconciledStrategy> {
        let mut planned = continuation.retroactive.clone();
        planned.extend(self.plan_remaining(continuation, kind, uma_level, months)?);
        self.reconcile(profile, paid, &planned)
    }

    /// Merge paid and planned months into one ledger and evaluate it
    pub fn reconcile(
        &self,
        profile: &Profile,
        paid: &[ContributionMonth],
        planned: &[ContributionMonth],
    ) -> SimResult<ReconciledStrategy> {
        profile.validate()?;

        let mut ledger = merge(paid, planned)?;
        if ledger.is_empty() {
            return Err(SimulationError::InvalidHistory("nothing to reconcile".to_string()));
        }
        if ledger.len() > MAX_PROGRAM_MONTHS as usize {
            return Err(SimulationError::InvalidHistory(format!(
                "{} merged months exceed the {} month program limit",
                ledger.len(),
                MAX_PROGRAM_MONTHS
            )));
        }

        let inferred_kind = infer_kind(&ledger);
        self.fill_salary_bases(profile, &mut ledger, inferred_kind)?;
        let average_uma = self.average_uma(&ledger)?;

        let schedule = self.engine.cost_calculator().price_months(&ledger)?;
        let params = StrategyParameters::new(
            inferred_kind,
            (average_uma.round() as u32).clamp(1, MAX_UMA_LEVEL),
            ledger.len() as u32,
            ledger[0].month,
        );
        log::debug!(
            "reconciled {} months ({} paid) as {} at {:.2} UMA",
            ledger.len(),
            ledger.iter().filter(|m| m.is_paid()).count(),
            inferred_kind,
            average_uma
        );
        let result = self.engine.evaluate(profile, params, schedule)?;

        Ok(ReconciledStrategy {
            profile: profile.clone(),
            ledger,
            inferred_kind,
            average_uma,
            result,
        })
    }

    /// Give every month a salary base.
    ///
    /// Paid months keep what was registered. Months without a usable value
    /// are projected from their UMA multiple with the inferred strategy
    /// (anchored at the first planned month), and fall back to the
    /// historical salary base when no multiple is known either.
    fn fill_salary_bases(&self, profile: &Profile, ledger: &mut [ContributionMonth], kind: StrategyKind) -> SimResult<()> {
        let uma = &self.engine.tables().uma;
        let anchor = ledger
            .iter()
            .position(|m| !m.is_paid())
            .unwrap_or(0);
        let anchor_month = ledger[anchor].month;

        for month in ledger.iter_mut() {
            if month.salary_base.is_finite() && month.salary_base > 0.0 {
                continue;
            }
            month.salary_base = if month.uma_multiple.is_finite() && month.uma_multiple > 0.0 {
                let start = if month.month < anchor_month { month.month } else { anchor_month };
                let projector = SalaryBaseProjector::new(kind, month.uma_multiple, start, uma)?;
                projector.salary_base(offset_index(start, month.month))?
            } else {
                profile.historical_salary_base
            };
        }
        Ok(())
    }

    fn average_uma(&self, ledger: &[ContributionMonth]) -> SimResult<f64> {
        let uma = &self.engine.tables().uma;
        let mut total = 0.0;
        for month in ledger {
            total += if month.uma_multiple > 0.0 {
                month.uma_multiple
            } else {
                month.salary_base / uma.value(month.month.effective_uma_year())?
            };
        }
        Ok(total / ledger.len() as f64)
    }
}

/// 1-based index of `month` in a window starting at `start`
fn offset_index(start: YearMonth, month: YearMonth) -> u32 {
    start.months_until(month).max(0) as u32 + 1
}

/// Fixed when every newly planned month shares one UMA level, progressive
/// otherwise. Retroactive months keep the old level and are not part of the
/// new plan; the whole ledger is used when nothing new is planned.
fn infer_kind(ledger: &[ContributionMonth]) -> StrategyKind {
    let planned: Vec<f64> = ledger
        .iter()
        .filter(|m| !m.is_paid() && !m.retroactive)
        .map(|m| m.uma_multiple)
        .collect();
    let levels = if planned.is_empty() {
        ledger.iter().map(|m| m.uma_multiple).collect()
    } else {
        planned
    };
    let first = levels.first().copied().unwrap_or(0.0);
    if levels.iter().all(|l| (l - first).abs() < 1e-9) {
        StrategyKind::Fixed
    } else {
        StrategyKind::Progressive
    }
}

/// Order by calendar month, drop planned months that collide with a paid
/// month, and re-index from 1. The result must cover consecutive months;
/// gaps have to be filled with owed months before merging.
fn merge(paid: &[ContributionMonth], planned: &[ContributionMonth]) -> SimResult<Vec<ContributionMonth>> {
    let mut merged: Vec<ContributionMonth> = Vec::with_capacity(paid.len() + planned.len());
    merged.extend(paid.iter().cloned().map(|mut m| {
        m.status = MonthStatus::Paid;
        m
    }));
    for month in planned {
        if paid.iter().any(|p| p.month == month.month) {
            log::debug!("dropping planned {} already paid", month.month);
            continue;
        }
        merged.push(month.clone());
    }
    merged.sort_by_key(|m| m.month);

    for pair in merged.windows(2) {
        if pair[0].month == pair[1].month {
            return Err(SimulationError::InvalidHistory(format!("month {} planned twice", pair[0].month)));
        }
        if pair[0].month.next() != pair[1].month {
            return Err(SimulationError::InvalidHistory(format!(
                "gap between {} and {}: missing months must be paid retroactively",
                pair[0].month, pair[1].month
            )));
        }
    }
    for (pos, month) in merged.iter_mut().enumerate() {
        month.index = pos as u32 + 1;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuity::ContinuityValidator;
    use crate::profile::CivilStatus;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn profile() -> Profile {
        Profile::new(
            NaiveDate::from_ymd_opt(1966, 1, 15).unwrap(),
            60,
            1000,
            CivilStatus::Spouse,
            150.0,
        )
    }

    fn paid_history(count: u32) -> Vec<ContributionMonth> {
        ym(2024, 2)
            .iter_months(count)
            .enumerate()
            .map(|(i, m)| ContributionMonth::paid(i as u32 + 1, m, 15.0 * 108.57, 15.0))
            .collect()
    }

    #[test]
    fn test_split_history_matches_from_scratch() {
        let engine = PensionEngine::default();
        let adapter = ReconciliationAdapter::new(&engine);
        let validator = ContinuityValidator::new(&engine.tables().uma);

        // 12 months paid, 24 more planned at the same fixed level
        let paid = paid_history(12);
        let continuation = validator
            .check(&paid, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(), None)
            .unwrap();
        assert_eq!(continuation.next_month, Some(ym(2025, 2)));

        // Planned at the salary registered when the strategy began
        let planned: Vec<_> = ym(2025, 2)
            .iter_months(24)
            .enumerate()
            .map(|(i, m)| ContributionMonth::planned(continuation.next_index() + i as u32, m, 15.0 * 108.57, 15.0))
            .collect();
        let reconciled = adapter.reconcile(&profile(), &paid, &planned).unwrap();

        let scratch = engine
            .simulate(
                &profile(),
                &StrategyParameters::new(StrategyKind::Fixed, 15, 36, ym(2024, 2)),
            )
            .unwrap();

        assert_eq!(reconciled.inferred_kind, StrategyKind::Fixed);
        assert_eq!(reconciled.ledger.len(), 36);
        assert_eq!(reconciled.paid_months(), 12);
        assert_relative_eq!(reconciled.average_uma, 15.0, epsilon = 1e-9);
        assert_relative_eq!(reconciled.result.total_investment, scratch.total_investment, epsilon = 1e-6);
        assert_relative_eq!(reconciled.result.monthly_pension, scratch.monthly_pension, epsilon = 1e-6);
    }

    #[test]
    fn test_ledger_is_contiguous_with_retroactive_months() {
        let engine = PensionEngine::default();
        let adapter = ReconciliationAdapter::new(&engine);
        let validator = ContinuityValidator::new(&engine.tables().uma);

        let paid = paid_history(10); // Feb..Nov 2024
        let continuation = validator
            .check(&paid, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), Some(ym(2025, 4)))
            .unwrap();
        let reconciled = adapter
            .reconcile_continuation(&profile(), &paid, &continuation, StrategyKind::Progressive, 20, 30)
            .unwrap();

        assert_eq!(reconciled.ledger.len(), 10 + 4 + 30);
        assert_eq!(reconciled.retroactive_months(), 4);
        for (pos, month) in reconciled.ledger.iter().enumerate() {
            assert_eq!(month.index, pos as u32 + 1);
        }
        for pair in reconciled.ledger.windows(2) {
            assert_eq!(pair[0].month.next(), pair[1].month);
        }
        // 10 paid + 4 retro at 15 UMA, 30 planned at 20 UMA
        assert_relative_eq!(reconciled.average_uma, (14.0 * 15.0 + 30.0 * 20.0) / 44.0, epsilon = 1e-9);
        // Planned months use one level only
        assert_eq!(reconciled.inferred_kind, StrategyKind::Fixed);
        assert!(reconciled.result.monthly_pension > 0.0);
    }

    #[test]
    fn test_mixed_levels_infer_progressive() {
        let engine = PensionEngine::default();
        let adapter = ReconciliationAdapter::new(&engine);

        let paid = paid_history(6);
        let planned = vec![
            ContributionMonth::planned(7, ym(2024, 8), 0.0, 10.0),
            ContributionMonth::planned(8, ym(2024, 9), 0.0, 12.0),
        ];
        let reconciled = adapter.reconcile(&profile(), &paid, &planned).unwrap();
        assert_eq!(reconciled.inferred_kind, StrategyKind::Progressive);
        assert_relative_eq!(reconciled.ledger[6].salary_base, 10.0 * 108.57, epsilon = 1e-9);
        assert_relative_eq!(reconciled.ledger[7].salary_base, 12.0 * 108.57, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_data_falls_back_to_historical_base() {
        let engine = PensionEngine::default();
        let adapter = ReconciliationAdapter::new(&engine);

        let mut paid = paid_history(3);
        paid[1].salary_base = 0.0;
        paid[1].uma_multiple = 0.0;
        let reconciled = adapter.reconcile(&profile(), &paid, &[]).unwrap();
        assert_eq!(reconciled.ledger[1].salary_base, 150.0);
    }

    #[test]
    fn test_planned_duplicates_of_paid_months_are_dropped() {
        let engine = PensionEngine::default();
        let adapter = ReconciliationAdapter::new(&engine);

        let paid = paid_history(4);
        let planned = vec![
            ContributionMonth::planned(4, ym(2024, 5), 0.0, 20.0),
            ContributionMonth::planned(5, ym(2024, 6), 0.0, 20.0),
        ];
        let reconciled = adapter.reconcile(&profile(), &paid, &planned).unwrap();
        assert_eq!(reconciled.ledger.len(), 5);
        assert!(reconciled.ledger[3].is_paid());
        assert_eq!(reconciled.ledger[3].uma_multiple, 15.0);
    }

    #[test]
    fn test_gap_between_paid_and_planned_rejected() {
        let engine = PensionEngine::default();
        let adapter = ReconciliationAdapter::new(&engine);

        // Paid through November 2024, planned from June 2027
        let paid = paid_history(10);
        let planned: Vec<_> = ym(2027, 6)
            .iter_months(12)
            .enumerate()
            .map(|(i, m)| ContributionMonth::planned(11 + i as u32, m, 0.0, 15.0))
            .collect();
        assert!(matches!(
            adapter.reconcile(&profile(), &paid, &planned),
            Err(SimulationError::InvalidHistory(_))
        ));

        // A hole inside the planned months is rejected too
        let holed = vec![
            ContributionMonth::planned(11, ym(2024, 12), 0.0, 15.0),
            ContributionMonth::planned(12, ym(2025, 2), 0.0, 15.0),
        ];
        assert!(matches!(
            adapter.reconcile(&profile(), &paid, &holed),
            Err(SimulationError::InvalidHistory(_))
        ));
    }

    #[test]
    fn test_over_limit_rejected() {
        let engine = PensionEngine::default();
        let adapter = ReconciliationAdapter::new(&engine);

        let paid = paid_history(50);
        let planned: Vec<_> = ym(2028, 4)
            .iter_months(10)
            .enumerate()
            .map(|(i, m)| ContributionMonth::planned(51 + i as u32, m, 0.0, 10.0))
            .collect();
        assert!(matches!(
            adapter.reconcile(&profile(), &paid, &planned),
            Err(SimulationError::InvalidHistory(_))
        ));
    }
}
